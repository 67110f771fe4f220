pub mod memory;
pub mod store;

pub use memory::InMemoryTodoStore;
pub use store::{Todo, TodoStore, TodoStoreError};
