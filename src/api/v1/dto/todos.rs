/*
 * Responsibility
 * - Todos の request/response DTO
 * - frontend に合わせて camelCase (todoText)
 */
use serde::{Deserialize, Serialize};

use crate::services::todos::Todo;

const MAX_TODO_TEXT_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub todo_text: String,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.todo_text.trim().is_empty() {
            return Err("todoText is required");
        }
        if self.todo_text.chars().count() > MAX_TODO_TEXT_CHARS {
            return Err("todoText must be <= 1000 chars");
        }

        Ok(())
    }
}

/// Every todo endpoint answers with the caller's full, freshly listed todos.
#[derive(Debug, Serialize)]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
}
