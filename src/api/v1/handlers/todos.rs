/*
 * Responsibility
 * - /todos 系 handler
 * - AuthCtxExtractor で受けた user_id の範囲だけを操作する
 * - 変更系も含めて、常に最新の一覧 ({"todos": [...]}) を返す
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{
        dto::todos::{CreateTodoRequest, TodosResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

async fn list_for(state: &AppState, user_id: &str) -> Result<Json<TodosResponse>, AppError> {
    let todos = state.todos.list(user_id).await?;
    Ok(Json(TodosResponse { todos }))
}

pub async fn list_todos(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<TodosResponse>, AppError> {
    list_for(&state, auth.user_id()).await
}

pub async fn create_todo(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Json(req): Json<CreateTodoRequest>,
) -> Result<Json<TodosResponse>, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let todo = state.todos.add(auth.user_id(), req.todo_text.trim()).await?;
    tracing::debug!(user_id = auth.user_id(), todo_id = %todo.id, "todo created");

    list_for(&state, auth.user_id()).await
}

pub async fn complete_todo(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(todo_id): Path<String>,
) -> Result<Json<TodosResponse>, AppError> {
    // unknown id (or someone else's) is a no-op
    if !state.todos.complete(auth.user_id(), &todo_id).await? {
        tracing::debug!(user_id = auth.user_id(), %todo_id, "complete: no such todo");
    }

    list_for(&state, auth.user_id()).await
}

pub async fn delete_todo(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Path(todo_id): Path<String>,
) -> Result<Json<TodosResponse>, AppError> {
    if !state.todos.delete(auth.user_id(), &todo_id).await? {
        tracing::debug!(user_id = auth.user_id(), %todo_id, "delete: no such todo");
    }

    list_for(&state, auth.user_id()).await
}
