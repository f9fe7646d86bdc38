// PII data directory: batch reads, YAML writes with diff records, copy/move/delete
// with backups, and the YAML inventory used by the editor's file picker.
// Every operation round-trips through disk; nothing is cached between requests.

pub mod error;
pub mod handlers;
pub mod ops;
pub mod paths;
pub mod reader;
pub mod scanner;
pub mod snapshots;
pub mod writer;

use std::path::{Path, PathBuf};

use crate::files::paths::PathResolver;

/// File operations rooted at one base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    resolver: PathResolver,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(base),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn base(&self) -> &Path {
        self.resolver.base()
    }
}
