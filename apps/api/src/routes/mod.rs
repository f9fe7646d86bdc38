pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::files::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/files",
            get(handlers::handle_list_files).delete(handlers::handle_delete_file),
        )
        .route("/api/files/read", post(handlers::handle_read_files))
        .route("/api/files/write", post(handlers::handle_write_file))
        .route("/api/files/copy", post(handlers::handle_copy_file))
        .route("/api/files/move", post(handlers::handle_move_file))
        .route("/api/files/patch", post(handlers::handle_patch_file))
        .with_state(state)
}
