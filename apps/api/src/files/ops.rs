use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};

use crate::files::error::{
    FileError, FileResult, MoveError, DESTINATION_EXISTS, FILE_MISSING, SAME_FILE,
    SOURCE_MISSING,
};
use crate::files::snapshots::write_backup;
use crate::files::FileStore;

#[derive(Debug, Clone)]
pub struct CopyOutcome {
    pub source_path: String,
    pub destination_path: String,
    pub resolved_source: PathBuf,
    pub resolved_destination: PathBuf,
    /// Whether a file already sat at the destination before the copy.
    pub overwritten: bool,
}

#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub file_path: String,
    pub resolved_path: PathBuf,
    pub backup_created: bool,
    pub backup_path: Option<PathBuf>,
}

impl FileStore {
    /// Copies the text of `source` to `destination`, creating parent directories.
    pub async fn copy_file(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> FileResult<CopyOutcome> {
        let resolved_source = self.resolver().resolve(source)?;
        let resolved_destination = self.resolver().resolve(destination)?;

        if !fs::try_exists(&resolved_source).await? {
            return Err(FileError::NotFound(SOURCE_MISSING.to_string()));
        }

        let destination_existed = fs::try_exists(&resolved_destination).await?;
        if destination_existed && !overwrite {
            return Err(FileError::Conflict(DESTINATION_EXISTS.to_string()));
        }

        if let Some(parent) = resolved_destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = fs::read_to_string(&resolved_source).await?;
        fs::write(&resolved_destination, content).await?;

        info!(
            "Copied {} to {}",
            resolved_source.display(),
            resolved_destination.display()
        );

        Ok(CopyOutcome {
            source_path: source.to_string(),
            destination_path: destination.to_string(),
            resolved_source,
            resolved_destination,
            overwritten: destination_existed,
        })
    }

    /// Deletes `relative`, first writing a backup record when `create_backup` is set.
    /// A failed backup is logged and does not block the deletion.
    pub async fn delete_file(
        &self,
        relative: &str,
        create_backup: bool,
    ) -> FileResult<DeleteOutcome> {
        let path = self.resolver().resolve(relative)?;

        if !fs::try_exists(&path).await? {
            return Err(FileError::NotFound(FILE_MISSING.to_string()));
        }

        let backup_path = if create_backup {
            match self.backup_before_delete(&path).await {
                Ok(backup) => Some(backup),
                Err(e) => {
                    warn!("Backup of {} failed, deleting anyway: {e}", path.display());
                    None
                }
            }
        } else {
            None
        };

        fs::remove_file(&path).await?;
        info!("Deleted {}", path.display());

        Ok(DeleteOutcome {
            file_path: relative.to_string(),
            resolved_path: path,
            backup_created: backup_path.is_some(),
            backup_path,
        })
    }

    async fn backup_before_delete(&self, path: &Path) -> FileResult<PathBuf> {
        let content = fs::read_to_string(path).await?;
        write_backup(path, &content, Utc::now()).await
    }

    /// Moves a file as copy-then-delete. Not atomic: if the delete fails after
    /// a successful copy, both files remain and the error carries a note.
    pub async fn move_file(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<CopyOutcome, MoveError> {
        // Copy-then-delete onto the same file would remove the only copy.
        let resolver = self.resolver();
        if let (Ok(from), Ok(to)) = (resolver.resolve(source), resolver.resolve(destination)) {
            if same_file(&from, &to).await {
                return Err(MoveError::Copy(FileError::Validation(SAME_FILE.to_string())));
            }
        }

        let copied = self
            .copy_file(source, destination, overwrite)
            .await
            .map_err(MoveError::Copy)?;

        // The destination already holds the content, so no backup is taken.
        let removed = self.delete_file(source, false).await;
        settle_move(copied, removed)
    }
}

/// True when both paths name one file, including through symlinks.
/// A destination that does not exist yet can never alias the source.
async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn settle_move(
    copied: CopyOutcome,
    removed: FileResult<DeleteOutcome>,
) -> Result<CopyOutcome, MoveError> {
    match removed {
        Ok(_) => Ok(copied),
        Err(e) => {
            warn!(
                "Move of {} left the source behind after copying to {}: {e}",
                copied.resolved_source.display(),
                copied.resolved_destination.display()
            );
            Err(MoveError::Delete {
                source: e,
                note: format!(
                    "File was copied to {} but the original at {} could not be removed",
                    copied.destination_path, copied.source_path
                ),
            })
        }
    }
}
