use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use crate::files::error::{FileError, FileResult};

/// Subdirectory scanned recursively for résumé variants.
pub const RESUMES_DIR: &str = "resumes";

/// YAML files found under a base directory.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub all_files: Vec<String>,
    pub main_dir_files: usize,
    pub resume_files: usize,
    pub total_files: usize,
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// YAML file names directly inside `dir`. A missing or unreadable directory
/// yields an empty list.
pub fn list_flat(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_yaml_file(e.path()))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// YAML files anywhere under `dir`, as `/`-joined paths relative to `base`.
pub fn list_recursive(dir: &Path, base: &Path) -> Vec<String> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // The root itself missing is the common case; only report deeper failures.
                if e.depth() > 0 {
                    warn!("Skipping unreadable entry under {}: {e}", dir.display());
                }
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_yaml_file(entry.path()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(base) {
            let joined = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(joined);
        }
    }
    files.sort();
    files
}

/// Top-level YAML files plus everything under `resumes/`, the latter prefixed
/// with `resumes/`.
pub fn inventory(root: &Path) -> Inventory {
    let main = list_flat(root);
    let resumes_root = root.join(RESUMES_DIR);
    let resumes: Vec<String> = list_recursive(&resumes_root, &resumes_root)
        .into_iter()
        .map(|f| format!("{RESUMES_DIR}/{f}"))
        .collect();

    let main_dir_files = main.len();
    let resume_files = resumes.len();
    let mut all_files = main;
    all_files.extend(resumes);

    Inventory {
        total_files: all_files.len(),
        all_files,
        main_dir_files,
        resume_files,
    }
}

/// Runs [`inventory`] on the blocking pool; directory walking is synchronous.
pub async fn scan_inventory(root: PathBuf) -> FileResult<Inventory> {
    tokio::task::spawn_blocking(move || inventory(&root))
        .await
        .map_err(|e| FileError::Io(format!("Directory scan failed: {e}")))
}
