//! Content reference resolution.
//!
//! Bodies are read once, while a snapshot is built, never per request.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;

/// Turns a configured content reference into its bytes.
pub trait ContentResolver: Send + Sync {
    /// `None` when the reference cannot be read.
    fn resolve(&self, reference: &str) -> Option<Bytes>;
}

/// Reads references as files below a root directory.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_of(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ContentResolver for FsResolver {
    fn resolve(&self, reference: &str) -> Option<Bytes> {
        let path = self.path_of(reference);
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "Content path is not a file");
            return None;
        }
        match fs::read(&path) {
            Ok(bytes) => Some(Bytes::from(bytes)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read content");
                None
            }
        }
    }
}

/// In-memory content, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    items: HashMap<String, Bytes>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.items.insert(reference.into(), body.into());
        self
    }
}

impl ContentResolver for MemoryResolver {
    fn resolve(&self, reference: &str) -> Option<Bytes> {
        self.items.get(reference).cloned()
    }
}
