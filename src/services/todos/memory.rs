use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::todos::store::{Todo, TodoResult, TodoStore, TodoStoreError};

const DEFAULT_MAX_TODOS_PER_USER: usize = 500;

/// Process-local todo store. Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryTodoStore {
    // user_id -> todos in creation order
    todos: RwLock<HashMap<String, Vec<Todo>>>,
    max_per_user: usize,
}

impl Default for InMemoryTodoStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_TODOS_PER_USER)
    }
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_per_user: usize) -> Self {
        Self {
            todos: RwLock::new(HashMap::new()),
            max_per_user,
        }
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, user_id: &str) -> TodoResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        let mut out = todos.get(user_id).cloned().unwrap_or_default();
        // stable sort keeps creation order within each group
        out.sort_by_key(|t| t.completed);
        Ok(out)
    }

    async fn add(&self, user_id: &str, text: &str) -> TodoResult<Todo> {
        let mut todos = self.todos.write().await;
        let list = todos.entry(user_id.to_string()).or_default();
        if list.len() >= self.max_per_user {
            return Err(TodoStoreError::LimitExceeded(self.max_per_user));
        }

        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        };
        list.push(todo.clone());

        Ok(todo)
    }

    async fn complete(&self, user_id: &str, todo_id: &str) -> TodoResult<bool> {
        let mut todos = self.todos.write().await;
        let found = todos
            .get_mut(user_id)
            .and_then(|list| list.iter_mut().find(|t| t.id == todo_id));

        Ok(match found {
            Some(todo) => {
                todo.completed = true;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, user_id: &str, todo_id: &str) -> TodoResult<bool> {
        let mut todos = self.todos.write().await;
        let Some(list) = todos.get_mut(user_id) else {
            return Ok(false);
        };

        let before = list.len();
        list.retain(|t| t.id != todo_id);
        let deleted = list.len() != before;

        if list.is_empty() {
            todos.remove(user_id);
        }
        Ok(deleted)
    }
}
