use std::path::{Component, Path, PathBuf};

use crate::files::error::{FileError, FileResult, PATH_ESCAPES_BASE};

/// Joins relative paths onto a base directory.
///
/// This is the trust boundary for every file operation: absolute paths and
/// paths that climb above the base with `..` are rejected before any I/O.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Joins `relative` onto the base with `.` and `..` folded away, so two
    /// spellings of the same file resolve to the same path.
    pub fn resolve(&self, relative: &str) -> FileResult<PathBuf> {
        let mut normalized = PathBuf::new();

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(FileError::Validation(PATH_ESCAPES_BASE.to_string()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(FileError::Validation(PATH_ESCAPES_BASE.to_string()));
                }
            }
        }

        Ok(self.base.join(normalized))
    }
}

/// Directory that holds diff and backup records for `file`.
pub fn diffs_dir_for(file: &Path) -> PathBuf {
    file.parent()
        .map(|parent| parent.join("diffs"))
        .unwrap_or_else(|| PathBuf::from("diffs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_onto_base() {
        let resolver = PathResolver::new("/data/pii");
        assert_eq!(
            resolver.resolve("resumes/main.yml").unwrap(),
            PathBuf::from("/data/pii/resumes/main.yml")
        );
    }

    #[test]
    fn test_resolve_allows_inner_parent_dir() {
        let resolver = PathResolver::new("/data/pii");
        assert_eq!(
            resolver.resolve("resumes/../data.yml").unwrap(),
            PathBuf::from("/data/pii/data.yml")
        );
        assert_eq!(
            resolver.resolve("./resumes/./main.yml").unwrap(),
            PathBuf::from("/data/pii/resumes/main.yml")
        );
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let resolver = PathResolver::new("/data/pii");
        let err = resolver.resolve("../secrets.yml").unwrap_err();
        assert_eq!(err.to_string(), PATH_ESCAPES_BASE);
        assert!(resolver.resolve("resumes/../../x.yml").is_err());
    }

    #[test]
    fn test_resolve_rejects_absolute() {
        let resolver = PathResolver::new("/data/pii");
        assert!(resolver.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn test_diffs_dir_is_sibling() {
        assert_eq!(
            diffs_dir_for(Path::new("/data/pii/resumes/main.yml")),
            PathBuf::from("/data/pii/resumes/diffs")
        );
    }
}
