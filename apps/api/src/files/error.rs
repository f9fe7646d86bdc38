use thiserror::Error;

/// Message for a copy/move whose source is missing.
pub const SOURCE_MISSING: &str = "Source file does not exist";
/// Message for a copy/move that would clobber an existing file.
pub const DESTINATION_EXISTS: &str = "Destination file already exists and overwrite is false";
/// Message for a delete/patch whose target is missing.
pub const FILE_MISSING: &str = "File does not exist";
/// Message for a move whose source and destination resolve to one file.
pub const SAME_FILE: &str = "Source and destination are the same file";
/// Message for a relative path that resolves outside its base directory.
pub const PATH_ESCAPES_BASE: &str = "Path escapes base directory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    NotFound,
    Conflict,
    Validation,
    Io,
}

/// Error raised by the file layer.
///
/// `Display` is the bare message: the HTTP contract depends on the exact text
/// of the not-found and conflict messages above.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Io(String),
}

impl FileError {
    pub fn kind(&self) -> FileErrorKind {
        match self {
            FileError::NotFound(_) => FileErrorKind::NotFound,
            FileError::Conflict(_) => FileErrorKind::Conflict,
            FileError::Validation(_) => FileErrorKind::Validation,
            FileError::Io(_) => FileErrorKind::Io,
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(err: std::io::Error) -> Self {
        FileError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for FileError {
    fn from(err: serde_yaml::Error) -> Self {
        FileError::Io(err.to_string())
    }
}

/// Failure of a two-phase move.
#[derive(Debug, Clone, Error)]
pub enum MoveError {
    /// Nothing was mutated.
    #[error("Copy failed: {0}")]
    Copy(FileError),

    /// The destination was written but the source is still on disk.
    #[error("Delete failed: {source}")]
    Delete { source: FileError, note: String },
}

pub type FileResult<T> = std::result::Result<T, FileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = FileError::Conflict(DESTINATION_EXISTS.to_string());
        assert_eq!(
            err.to_string(),
            "Destination file already exists and overwrite is false"
        );
        assert_eq!(err.kind(), FileErrorKind::Conflict);
    }

    #[test]
    fn test_io_error_keeps_underlying_text() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: FileError = io.into();
        assert_eq!(err.kind(), FileErrorKind::Io);
        assert_eq!(err.to_string(), "permission denied");
    }

    #[test]
    fn test_move_error_messages() {
        let copy = MoveError::Copy(FileError::NotFound(SOURCE_MISSING.to_string()));
        assert_eq!(copy.to_string(), "Copy failed: Source file does not exist");

        let delete = MoveError::Delete {
            source: FileError::Io("busy".to_string()),
            note: "copied".to_string(),
        };
        assert_eq!(delete.to_string(), "Delete failed: busy");
    }
}
