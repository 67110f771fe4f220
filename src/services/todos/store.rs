//! Todo store interface used by the todo handlers.
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Store-layer errors.
///
/// Kept independent from `AppError`; the handler layer decides what the client sees.
#[derive(Debug, Error)]
pub enum TodoStoreError {
    #[error("todo limit of {0} per user reached")]
    LimitExceeded(usize),
}

pub type TodoResult<T> = Result<T, TodoStoreError>;

/// Per-user todo storage.
///
/// Every method is scoped by `user_id`; an implementation must never return or
/// modify another user's todos. Listing order: incomplete first, then creation order.
///
/// `complete` / `delete` on an unknown id are no-ops and return `Ok(false)`.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn list(&self, user_id: &str) -> TodoResult<Vec<Todo>>;

    async fn add(&self, user_id: &str, text: &str) -> TodoResult<Todo>;

    async fn complete(&self, user_id: &str, todo_id: &str) -> TodoResult<bool>;

    async fn delete(&self, user_id: &str, todo_id: &str) -> TodoResult<bool>;
}
