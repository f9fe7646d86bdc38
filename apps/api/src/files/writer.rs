use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::files::error::FileResult;
use crate::files::snapshots::write_diff;
use crate::files::FileStore;

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub file_path: String,
    pub resolved_path: PathBuf,
    /// Whether the file was on disk before this write.
    pub file_existed: bool,
    /// True iff a diff was requested, the content changed and the record was written.
    pub diff_created: bool,
}

impl FileStore {
    /// Serializes `data` to YAML and writes it to `relative`.
    pub async fn write_data(
        &self,
        relative: &str,
        data: &Value,
        create_diff: bool,
    ) -> FileResult<WriteOutcome> {
        let yaml = serde_yaml::to_string(data)?;
        self.write_yaml(relative, &yaml, create_diff).await
    }

    /// Writes caller-rendered YAML text verbatim, keeping its formatting.
    ///
    /// The previous content is read for diffing and the new content is written
    /// in a separate step; concurrent writers to the same path are last-write-wins.
    pub async fn write_yaml(
        &self,
        relative: &str,
        content: &str,
        create_diff: bool,
    ) -> FileResult<WriteOutcome> {
        let path = self.resolver().resolve(relative)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let previous = if fs::try_exists(&path).await? {
            Some(fs::read_to_string(&path).await?)
        } else {
            None
        };
        let file_existed = previous.is_some();

        fs::write(&path, content).await?;
        info!("Wrote {} ({} bytes)", path.display(), content.len());

        let previous = previous.unwrap_or_default();
        let diff_created = if create_diff && previous != content {
            match write_diff(&path, &previous, content, Utc::now()).await {
                Ok(_) => true,
                Err(e) => {
                    warn!("Diff record for {} was not written: {e}", path.display());
                    false
                }
            }
        } else {
            false
        };

        Ok(WriteOutcome {
            file_path: relative.to_string(),
            resolved_path: path,
            file_existed,
            diff_created,
        })
    }
}
