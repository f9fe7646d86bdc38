use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::files::error::{FileError, FileResult, FILE_MISSING};
use crate::files::FileStore;
use crate::yaml_path::yaml_to_json;

/// Outcome of reading one file in a batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ReadEntry {
    /// Parsed YAML/JSON, or the raw text when the file is neither.
    Parsed(Value),
    Failed(ReadFailure),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadFailure {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl ReadEntry {
    fn read_failed(message: String) -> Self {
        ReadEntry::Failed(ReadFailure {
            error: "Failed to read file".to_string(),
            message,
            raw_content: None,
        })
    }

    fn yaml_failed(message: String, raw: String) -> Self {
        ReadEntry::Failed(ReadFailure {
            error: "Failed to parse YAML".to_string(),
            message,
            raw_content: Some(raw),
        })
    }
}

pub fn is_yaml_path(path: &str) -> bool {
    path.ends_with(".yml") || path.ends_with(".yaml")
}

impl FileStore {
    /// Reads every path in `files`, in order. A failure is reported inline for
    /// that entry and never fails the batch.
    pub async fn read_files(&self, files: &[String]) -> Vec<(String, ReadEntry)> {
        let mut results = Vec::with_capacity(files.len());
        for relative in files {
            let entry = self.read_one(relative).await;
            results.push((relative.clone(), entry));
        }
        results
    }

    /// Raw text of one file; a missing file is `NotFound`.
    pub async fn read_text(&self, relative: &str) -> FileResult<String> {
        let path = self.resolver().resolve(relative)?;
        if !fs::try_exists(&path).await? {
            return Err(FileError::NotFound(FILE_MISSING.to_string()));
        }
        Ok(fs::read_to_string(&path).await?)
    }

    async fn read_one(&self, relative: &str) -> ReadEntry {
        let path = match self.resolver().resolve(relative) {
            Ok(path) => path,
            Err(e) => return ReadEntry::read_failed(e.to_string()),
        };

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("Could not read {}: {e}", path.display());
                return ReadEntry::read_failed(e.to_string());
            }
        };

        parse_content(relative, content)
    }
}

fn parse_content(relative: &str, content: String) -> ReadEntry {
    if is_yaml_path(relative) {
        return match serde_yaml::from_str::<serde_yaml::Value>(&content) {
            Ok(doc) => ReadEntry::Parsed(yaml_to_json(&doc)),
            Err(e) => ReadEntry::yaml_failed(e.to_string(), content),
        };
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(value) => ReadEntry::Parsed(value),
        Err(_) => ReadEntry::Parsed(Value::String(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &str)]) -> (TempDir, FileStore) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            let path = tmp.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let store = FileStore::new(tmp.path());
        (tmp, store)
    }

    #[tokio::test]
    async fn test_read_yaml_file() {
        let (_tmp, store) = store_with(&[("resume.yml", "name: Ada\nskills:\n  - Rust\n")]);
        let results = store.read_files(&["resume.yml".to_string()]).await;
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].1,
            ReadEntry::Parsed(json!({"name": "Ada", "skills": ["Rust"]}))
        );
    }

    #[tokio::test]
    async fn test_invalid_yaml_reported_inline() {
        let (_tmp, store) = store_with(&[
            ("invalid.yml", "age: [invalid yaml structure"),
            ("ok.yaml", "a: 1"),
        ]);
        let results = store
            .read_files(&["invalid.yml".to_string(), "ok.yaml".to_string()])
            .await;

        let (key, entry) = &results[0];
        assert_eq!(key, "invalid.yml");
        match entry {
            ReadEntry::Failed(failure) => {
                assert_eq!(failure.error, "Failed to parse YAML");
                assert!(!failure.message.is_empty());
                assert_eq!(
                    failure.raw_content.as_deref(),
                    Some("age: [invalid yaml structure")
                );
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(results[1].1, ReadEntry::Parsed(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_json_and_raw_fallback() {
        let (_tmp, store) = store_with(&[
            ("data.json", r#"{"k": [1, 2]}"#),
            ("notes.txt", "just text"),
        ]);
        let results = store
            .read_files(&["data.json".to_string(), "notes.txt".to_string()])
            .await;
        assert_eq!(results[0].1, ReadEntry::Parsed(json!({"k": [1, 2]})));
        assert_eq!(results[1].1, ReadEntry::Parsed(json!("just text")));
    }

    #[tokio::test]
    async fn test_missing_file_reported_inline() {
        let (_tmp, store) = store_with(&[]);
        let results = store.read_files(&["missing.yml".to_string()]).await;
        match &results[0].1 {
            ReadEntry::Failed(failure) => {
                assert_eq!(failure.error, "Failed to read file");
                assert!(failure.raw_content.is_none());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (_tmp, store) = store_with(&[]);
        assert!(store.read_files(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_read_text_missing_is_not_found() {
        let (_tmp, store) = store_with(&[("cv.yml", "a: 1\n")]);
        assert_eq!(store.read_text("cv.yml").await.unwrap(), "a: 1\n");
        let err = store.read_text("gone.yml").await.unwrap_err();
        assert_eq!(err, FileError::NotFound("File does not exist".to_string()));
    }

    #[test]
    fn test_failure_serializes_camel_case() {
        let entry = ReadEntry::yaml_failed("bad".to_string(), "raw".to_string());
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"error": "Failed to parse YAML", "message": "bad", "rawContent": "raw"})
        );
    }
}
