//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::filter::SyntaxError;

/// Error type for configuration loading and snapshot construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid onlyIf predicate: {0}")]
    InvalidPredicate(#[from] SyntaxError),

    #[error("Content {name:?} is declared but could not be read")]
    MissingContent { name: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML (or `.json`) file.
///
/// A relative or missing `maintenance.content_root` is resolved against the
/// directory containing the file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let mut config: GateConfig = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.maintenance.content_root = Some(match config.maintenance.content_root.take() {
        Some(root) if root.is_absolute() => root,
        Some(root) => base.join(root),
        None => base.to_path_buf(),
    });

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "gate.toml",
            r#"
[listener]
bind_address = "127.0.0.1:8080"

[maintenance]
enabled = "true"
content = ["pages/foo.html"]
only_if = 'http.host == "example.com"'
"#,
        );

        let config = load_config(&path).unwrap();
        assert!(config.maintenance.enabled);
        assert_eq!(config.maintenance.content_root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "gate.json",
            r#"{"maintenance": {"enabled": "false", "contentRoot": "static"}}"#,
        );

        let config = load_config(&path).unwrap();
        assert!(!config.maintenance.enabled);
        assert_eq!(
            config.maintenance.content_root,
            Some(dir.path().join("static"))
        );
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "gate.toml",
            "[timeouts]\nrequest_secs = 0\n",
        );

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/gate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "gate.toml", "[maintenance\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }
}
