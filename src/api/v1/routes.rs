/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /todos 系は session middleware の内側、/health は外側
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::session;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    todos::{complete_todo, create_todo, delete_todo, list_todos},
};

/// Routes that need a session (mounted under `/api`).
pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{todo_id}", axum::routing::delete(delete_todo))
        .route("/todos/{todo_id}/complete", post(complete_todo));

    session::apply(protected)
}

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
