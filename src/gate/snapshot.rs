//! Configuration snapshots.
//!
//! A snapshot is everything a request decision needs, built once per
//! configuration update. Building is the only fallible step: predicate
//! syntax and unreadable content are rejected here, and the caller keeps
//! serving the previous snapshot.

use bytes::Bytes;

use crate::config::{ConfigError, MaintenanceConfig};
use crate::filter::{self, Expr};
use crate::gate::resolver::ContentResolver;
use crate::negotiate::{media_type_for, ContentAlternative};

/// A declared content item and its bytes, if they could be read.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub name: String,
    pub body: Option<Bytes>,
}

impl ContentItem {
    pub fn new(name: impl Into<String>, body: Option<Bytes>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

/// Immutable maintenance configuration.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    enabled: bool,
    predicate: Option<Expr>,
    alternatives: Vec<ContentAlternative>,
}

impl Snapshot {
    /// A snapshot that passes every request through.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Compile raw settings into a snapshot.
    ///
    /// A disabled gate skips compilation entirely, so switching maintenance
    /// off is never blocked by a broken predicate or missing content.
    pub fn build(
        enabled: bool,
        predicate_source: Option<&str>,
        items: Vec<ContentItem>,
    ) -> Result<Self, ConfigError> {
        if !enabled {
            tracing::info!("Maintenance mode disabled");
            return Ok(Self::disabled());
        }

        let predicate = predicate_source.map(filter::parse).transpose()?;
        match predicate_source {
            Some(source) => tracing::info!(only_if = %source, "Maintenance mode enabled for matching requests"),
            None => tracing::info!("Maintenance mode enabled for all requests"),
        }

        let mut alternatives: Vec<ContentAlternative> = Vec::with_capacity(items.len());
        for item in items {
            let body = item.body.ok_or_else(|| ConfigError::MissingContent {
                name: item.name.clone(),
            })?;
            let media_type = media_type_for(&item.name);

            // An earlier item of the same type always wins negotiation.
            if alternatives.iter().any(|alt| alt.media_type == media_type) {
                tracing::warn!(
                    name = %item.name,
                    media_type,
                    "Duplicate maintenance content for media type, skipping"
                );
                continue;
            }

            tracing::info!(name = %item.name, media_type, bytes = body.len(), "Registered maintenance content");
            alternatives.push(ContentAlternative::new(media_type, body));
        }

        Ok(Self {
            enabled,
            predicate,
            alternatives,
        })
    }

    /// Build from the `maintenance` config section, reading content through
    /// `resolver`.
    pub fn from_config(
        config: &MaintenanceConfig,
        resolver: &dyn ContentResolver,
    ) -> Result<Self, ConfigError> {
        let items = if config.enabled {
            config
                .content
                .iter()
                .map(|reference| ContentItem::new(reference.as_str(), resolver.resolve(reference)))
                .collect()
        } else {
            Vec::new()
        };

        Self::build(config.enabled, config.predicate_source(), items)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// `None` means every request matches.
    pub fn predicate(&self) -> Option<&Expr> {
        self.predicate.as_ref()
    }

    pub fn alternatives(&self) -> &[ContentAlternative] {
        &self.alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SyntaxErrorKind;
    use crate::gate::resolver::MemoryResolver;

    fn item(name: &str, body: &'static str) -> ContentItem {
        ContentItem::new(name, Some(Bytes::from(body)))
    }

    #[test]
    fn test_build_preserves_order() {
        let snapshot = Snapshot::build(
            true,
            None,
            vec![item("foo.html", "<h1>Maintenance</h1>"), item("ok.txt", "Maintenance")],
        )
        .unwrap();

        let types: Vec<_> = snapshot.alternatives().iter().map(|a| a.media_type).collect();
        assert_eq!(types, vec!["text/html", "text/plain"]);
        assert!(snapshot.predicate().is_none());
    }

    #[test]
    fn test_build_rejects_bad_predicate() {
        let err = Snapshot::build(true, Some("http.host =="), vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPredicate(_)));

        let err = Snapshot::build(true, Some(r#"http.path ~ "[""#), vec![]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPredicate(_)));
    }

    #[test]
    fn test_build_rejects_deeply_nested_predicate() {
        let source = format!("{}http.method == \"GET\"", "not ".repeat(2000));
        match Snapshot::build(true, Some(&source), vec![]).unwrap_err() {
            ConfigError::InvalidPredicate(e) => assert_eq!(e.kind, SyntaxErrorKind::TooDeep),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_unreadable_content() {
        let err = Snapshot::build(
            true,
            None,
            vec![item("foo.html", "x"), ContentItem::new("gone.txt", None)],
        )
        .unwrap_err();
        match err {
            ConfigError::MissingContent { name } => assert_eq!(name, "gone.txt"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_build_skips_duplicate_media_types() {
        let snapshot = Snapshot::build(
            true,
            None,
            vec![item("a.html", "first"), item("b.htm", "second"), item("c.txt", "plain")],
        )
        .unwrap();
        assert_eq!(snapshot.alternatives().len(), 2);
        assert_eq!(snapshot.alternatives()[0].body, Bytes::from("first"));
    }

    #[test]
    fn test_disabled_skips_compilation() {
        let snapshot =
            Snapshot::build(false, Some("((("), vec![ContentItem::new("gone.txt", None)]).unwrap();
        assert!(!snapshot.enabled());
        assert!(snapshot.alternatives().is_empty());
    }

    #[test]
    fn test_from_config() {
        let resolver = MemoryResolver::new()
            .with("foo.html", "<h1>Maintenance</h1>")
            .with("ok.txt", "Maintenance");
        let config = MaintenanceConfig {
            enabled: true,
            content: vec!["foo.html".into(), "ok.txt".into()],
            only_if: Some(r#"http.method == "POST""#.into()),
            content_root: None,
        };

        let snapshot = Snapshot::from_config(&config, &resolver).unwrap();
        assert!(snapshot.enabled());
        assert!(snapshot.predicate().is_some());
        assert_eq!(snapshot.alternatives().len(), 2);

        let config = MaintenanceConfig {
            content: vec!["missing.html".into()],
            ..config
        };
        assert!(Snapshot::from_config(&config, &resolver).is_err());
    }
}
