use std::path::PathBuf;

use crate::config::Config;
use crate::files::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Base directory for a request: the `directory` override when given,
    /// otherwise the configured PII path.
    pub fn base_dir(&self, directory: Option<&str>) -> PathBuf {
        match directory.map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => self.config.pii_path.clone(),
        }
    }

    pub fn store_for(&self, directory: Option<&str>) -> FileStore {
        FileStore::new(self.base_dir(directory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_prefers_override() {
        let state = AppState::new(Config::with_pii_path("/srv/pii"));
        assert_eq!(state.base_dir(Some("/tmp/other")), PathBuf::from("/tmp/other"));
        assert_eq!(state.base_dir(Some("  ")), PathBuf::from("/srv/pii"));
        assert_eq!(state.base_dir(None), PathBuf::from("/srv/pii"));
    }
}
