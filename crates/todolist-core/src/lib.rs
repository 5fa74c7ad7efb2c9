pub mod filter;
pub mod forms;

// Re-exports
pub use filter::TaskFilter;
pub use forms::{FieldError, FormErrors, TaskForm, TaskListForm};
