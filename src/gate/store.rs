//! The current snapshot, shared by every request.

use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::config::{ConfigError, MaintenanceConfig};
use crate::filter::RequestAttributes;
use crate::gate::decision::{decide, Decision};
use crate::gate::resolver::ContentResolver;
use crate::gate::snapshot::Snapshot;
use crate::observability::metrics;

/// Holds the current [`Snapshot`] behind an atomic pointer.
///
/// Readers never lock. A request that loaded a snapshot keeps using it even
/// if a newer one is published meanwhile; the old one is freed once the
/// last such request finishes.
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Guard<Arc<Snapshot>> {
        self.current.load()
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Build a snapshot from `config` and publish it. On error nothing
    /// changes.
    pub fn reload(
        &self,
        config: &MaintenanceConfig,
        resolver: &dyn ContentResolver,
    ) -> Result<(), ConfigError> {
        match Snapshot::from_config(config, resolver) {
            Ok(snapshot) => {
                self.publish(snapshot);
                metrics::record_reload("applied");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected maintenance configuration, keeping previous snapshot");
                metrics::record_reload("rejected");
                Err(e)
            }
        }
    }

    /// Decide against the current snapshot.
    pub fn decide(&self, attrs: &RequestAttributes<'_>, accept: Option<&str>) -> Decision {
        decide(&self.current(), attrs, accept)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::disabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::resolver::MemoryResolver;
    use std::thread;

    fn maintenance(enabled: bool, only_if: Option<&str>, content: &[&str]) -> MaintenanceConfig {
        MaintenanceConfig {
            enabled,
            content: content.iter().map(|c| c.to_string()).collect(),
            only_if: only_if.map(String::from),
            content_root: None,
        }
    }

    #[test]
    fn test_reload_swaps_snapshot() {
        let store = SnapshotStore::default();
        let resolver = MemoryResolver::new();
        let attrs = RequestAttributes::default();

        assert_eq!(store.decide(&attrs, None), Decision::PassThrough);
        store.reload(&maintenance(true, None, &[]), &resolver).unwrap();
        assert!(store.decide(&attrs, None).is_intercept());
    }

    #[test]
    fn test_failed_reload_keeps_previous() {
        let store = SnapshotStore::default();
        let resolver = MemoryResolver::new().with("ok.txt", "Maintenance");
        store
            .reload(&maintenance(true, None, &["ok.txt"]), &resolver)
            .unwrap();

        let bad_predicate = maintenance(true, Some("http.host in {"), &["ok.txt"]);
        assert!(store.reload(&bad_predicate, &resolver).is_err());

        let missing_content = maintenance(true, None, &["ok.txt", "gone.html"]);
        assert!(store.reload(&missing_content, &resolver).is_err());

        let nested = format!("{}http.method == \"GET\"", "not (".repeat(5000));
        let too_deep = maintenance(true, Some(&nested), &["ok.txt"]);
        assert!(store.reload(&too_deep, &resolver).is_err());

        let current = store.current();
        assert!(current.enabled());
        assert!(current.predicate().is_none());
        assert_eq!(current.alternatives().len(), 1);
    }

    #[test]
    fn test_readers_see_whole_snapshots() {
        let store = Arc::new(SnapshotStore::default());
        let resolver = MemoryResolver::new()
            .with("a.html", "A")
            .with("b.txt", "B");
        let with_html = maintenance(true, Some(r#"http.host == "a""#), &["a.html"]);
        let with_text = maintenance(true, Some(r#"http.host == "b""#), &["b.txt"]);
        store.reload(&with_html, &resolver).unwrap();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                let attrs = RequestAttributes {
                    host: "a",
                    ..Default::default()
                };
                for _ in 0..10_000 {
                    let snapshot = store.current();
                    let host_a = snapshot
                        .predicate()
                        .map_or(false, |expr| expr.evaluate(&attrs));
                    let media_type = snapshot.alternatives()[0].media_type;
                    // Predicate and content always come from the same update.
                    assert_eq!(host_a, media_type == "text/html");
                }
            })
        };

        for i in 0..1_000 {
            let next = if i % 2 == 0 { &with_text } else { &with_html };
            store.reload(next, &resolver).unwrap();
        }
        reader.join().unwrap();
    }
}
