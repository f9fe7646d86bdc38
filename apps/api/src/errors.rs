use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::files::error::{FileError, MoveError};
use crate::yaml_path::YamlPathError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// The body is always `{"success": false, "error": <message>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Rejected operation (missing source, existing destination) on routes
    /// that answer every failure with 400.
    #[error("{0}")]
    BadRequest(String),

    /// Move copied the file but could not remove the source.
    #[error("{message}")]
    PartialMove { message: String, note: String },

    /// I/O failure; the underlying message is passed through verbatim.
    #[error("{message}")]
    Io {
        message: String,
        file_path: Option<String>,
    },

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// I/O failure echoing the request's relative path for correlation.
    pub fn io_for(file_path: &str, err: FileError) -> Self {
        AppError::Io {
            message: err.to_string(),
            file_path: Some(file_path.to_string()),
        }
    }

    /// Maps every file error to 400, as the copy and move routes do.
    pub fn rejected(err: FileError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<FileError> for AppError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound(msg) => AppError::NotFound(msg),
            FileError::Conflict(msg) => AppError::BadRequest(msg),
            FileError::Validation(msg) => AppError::Validation(msg),
            FileError::Io(message) => AppError::Io {
                message,
                file_path: None,
            },
        }
    }
}

impl From<MoveError> for AppError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::Copy(_) => AppError::BadRequest(err.to_string()),
            MoveError::Delete { ref note, .. } => AppError::PartialMove {
                note: note.clone(),
                message: err.to_string(),
            },
        }
    }
}

impl From<YamlPathError> for AppError {
    fn from(err: YamlPathError) -> Self {
        match err {
            YamlPathError::Serialize(_) => AppError::Io {
                message: err.to_string(),
                file_path: None,
            },
            _ => AppError::Validation(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(self.to_string()));

        let status = match &self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PartialMove { message, note } => {
                tracing::warn!("Partial move: {message} ({note})");
                body.insert("note".to_string(), Value::String(note.clone()));
                StatusCode::BAD_REQUEST
            }
            AppError::Io { message, file_path } => {
                tracing::error!("I/O error: {message}");
                if let Some(path) = file_path {
                    body.insert("filePath".to_string(), Value::String(path.clone()));
                }
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(Value::Object(body))).into_response()
    }
}
