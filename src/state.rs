/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc)
 *
 * Notes
 * - 認証済み identity はここに置かない (request extensions の AuthCtx が持つ)
 */
use std::sync::Arc;

use crate::services::todos::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(todos: Arc<dyn TodoStore>) -> Self {
        Self { todos }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("todos", &self.todos.backend_name())
            .finish()
    }
}
