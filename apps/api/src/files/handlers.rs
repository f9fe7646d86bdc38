//! Axum route handlers for the file-management API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::files::error::{FileError, FileErrorKind};
use crate::files::ops::CopyOutcome;
use crate::files::scanner::{scan_inventory, Inventory};
use crate::state::AppState;
use crate::yaml_path::{json_to_yaml, patch_document, yaml_to_json};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub directory: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub directory: String,
    #[serde(flatten)]
    pub inventory: Inventory,
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    /// Kept untyped so a wrong shape gets the API's own 400 message.
    pub files: Option<Value>,
    pub directory: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    pub success: bool,
    pub directory: String,
    pub files: Map<String, Value>,
    pub total_files: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub data: Option<Value>,
    pub yaml_content: Option<String>,
    pub file_path: Option<String>,
    pub directory: Option<String>,
    pub create_diff: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    pub success: bool,
    pub file_path: String,
    pub resolved_path: String,
    pub file_existed: bool,
    pub diff_created: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_path: Option<String>,
    pub destination_path: Option<String>,
    pub directory: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub source_path: String,
    pub destination_path: String,
    pub resolved_source_path: String,
    pub resolved_destination_path: String,
    pub overwritten: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub file_path: Option<String>,
    pub directory: Option<String>,
    /// Anything other than the literal `false` keeps the backup on.
    pub create_backup: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub file_path: String,
    pub resolved_path: String,
    pub backup_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    pub file_path: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub value: Value,
    pub directory: Option<String>,
    pub create_diff: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchResponse {
    pub success: bool,
    pub file_path: String,
    pub path: String,
    /// Value previously stored at `path`, null when it did not exist.
    pub previous_value: Value,
    pub diff_created: bool,
}

impl From<CopyOutcome> for TransferResponse {
    fn from(outcome: CopyOutcome) -> Self {
        TransferResponse {
            success: true,
            resolved_source_path: outcome.resolved_source.display().to_string(),
            resolved_destination_path: outcome.resolved_destination.display().to_string(),
            source_path: outcome.source_path,
            destination_path: outcome.destination_path,
            overwritten: outcome.overwritten,
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Write failures: I/O problems are 500s that echo the path, the rest keep their kind.
fn write_failure(file_path: &str, err: FileError) -> AppError {
    match err.kind() {
        FileErrorKind::Io => AppError::io_for(file_path, err),
        _ => err.into(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/files
///
/// Lists top-level YAML files and everything under `resumes/`.
pub async fn handle_list_files(
    State(state): State<AppState>,
    Query(params): Query<DirectoryQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let base = state.base_dir(params.directory.as_deref());
    let inventory = scan_inventory(base.clone()).await?;

    Ok(Json(ListResponse {
        success: true,
        directory: base.display().to_string(),
        inventory,
    }))
}

/// POST /api/files/read
///
/// Reads a batch of files. Per-file failures are reported inside `files`.
pub async fn handle_read_files(
    State(state): State<AppState>,
    Json(request): Json<ReadRequest>,
) -> Result<Json<ReadResponse>, AppError> {
    let files: Vec<String> = request
        .files
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| AppError::Validation("Files array is required".to_string()))?;

    let store = state.store_for(request.directory.as_deref());
    let results = store.read_files(&files).await;

    let mut map = Map::new();
    for (path, entry) in results {
        let value = serde_json::to_value(entry).map_err(|e| AppError::Internal(e.into()))?;
        map.insert(path, value);
    }

    Ok(Json(ReadResponse {
        success: true,
        directory: store.base().display().to_string(),
        total_files: map.len(),
        files: map,
    }))
}

/// POST /api/files/write
///
/// Writes `yamlContent` verbatim, or `data` serialized to YAML.
/// An empty `yamlContent` is ignored. `createDiff` defaults to true.
pub async fn handle_write_file(
    State(state): State<AppState>,
    Json(request): Json<WriteRequest>,
) -> Result<Json<WriteResponse>, AppError> {
    let file_path = required(request.file_path)
        .ok_or_else(|| AppError::Validation("File path is required".to_string()))?;
    let create_diff = request.create_diff.unwrap_or(true);
    let store = state.store_for(request.directory.as_deref());

    // An empty `yamlContent` would truncate the file, so it counts as absent.
    let yaml_content = request.yaml_content.filter(|yaml| !yaml.is_empty());
    let outcome = match (yaml_content, request.data) {
        (Some(yaml), _) => store.write_yaml(&file_path, &yaml, create_diff).await,
        (None, Some(data)) => store.write_data(&file_path, &data, create_diff).await,
        (None, None) => {
            return Err(AppError::Validation(
                "Either data or yamlContent is required".to_string(),
            ))
        }
    }
    .map_err(|e| write_failure(&file_path, e))?;

    Ok(Json(WriteResponse {
        success: true,
        file_path: outcome.file_path,
        resolved_path: outcome.resolved_path.display().to_string(),
        file_existed: outcome.file_existed,
        diff_created: outcome.diff_created,
    }))
}

fn transfer_paths(request: &TransferRequest) -> Result<(String, String), AppError> {
    match (
        required(request.source_path.clone()),
        required(request.destination_path.clone()),
    ) {
        (Some(source), Some(destination)) => Ok((source, destination)),
        _ => Err(AppError::Validation(
            "Source and destination paths are required".to_string(),
        )),
    }
}

/// POST /api/files/copy
pub async fn handle_copy_file(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let (source, destination) = transfer_paths(&request)?;
    let store = state.store_for(request.directory.as_deref());

    let outcome = store
        .copy_file(&source, &destination, request.overwrite)
        .await
        .map_err(AppError::rejected)?;

    Ok(Json(outcome.into()))
}

/// POST /api/files/move
///
/// Copy then delete. A failed delete answers 400 with a `note`: the file now
/// exists at both paths.
pub async fn handle_move_file(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let (source, destination) = transfer_paths(&request)?;
    let store = state.store_for(request.directory.as_deref());

    let outcome = store
        .move_file(&source, &destination, request.overwrite)
        .await?;

    Ok(Json(outcome.into()))
}

/// DELETE /api/files?filePath=...&createBackup=...
pub async fn handle_delete_file(
    State(state): State<AppState>,
    Query(params): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let file_path = required(params.file_path)
        .ok_or_else(|| AppError::Validation("File path is required".to_string()))?;
    let create_backup = params.create_backup.as_deref() != Some("false");
    let store = state.store_for(params.directory.as_deref());

    let outcome = store.delete_file(&file_path, create_backup).await?;

    Ok(Json(DeleteResponse {
        success: true,
        file_path: outcome.file_path,
        resolved_path: outcome.resolved_path.display().to_string(),
        backup_created: outcome.backup_created,
        backup_path: outcome.backup_path.map(|p| p.display().to_string()),
    }))
}

/// POST /api/files/patch
///
/// Sets one nested field (`path`, e.g. `workExperience.0.bubbles.1`) in a YAML
/// file and rewrites the document.
pub async fn handle_patch_file(
    State(state): State<AppState>,
    Json(request): Json<PatchRequest>,
) -> Result<Json<PatchResponse>, AppError> {
    let (file_path, path) = match (required(request.file_path), required(request.path)) {
        (Some(file_path), Some(path)) => (file_path, path),
        _ => {
            return Err(AppError::Validation(
                "File path and YAML path are required".to_string(),
            ))
        }
    };
    let store = state.store_for(request.directory.as_deref());

    let current = store.read_text(&file_path).await?;
    let patched = patch_document(&current, &path, json_to_yaml(&request.value)?)?;
    let outcome = store
        .write_yaml(&file_path, &patched.yaml, request.create_diff.unwrap_or(true))
        .await
        .map_err(|e| write_failure(&file_path, e))?;

    Ok(Json(PatchResponse {
        success: true,
        file_path: outcome.file_path,
        path,
        previous_value: patched.previous.as_ref().map(yaml_to_json).unwrap_or(Value::Null),
        diff_created: outcome.diff_created,
    }))
}
