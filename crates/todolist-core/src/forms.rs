use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on task and list names, matching the column width.
pub const MAX_NAME_LEN: usize = 200;

/// A single validation failure, attached to the field that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The set of per-field errors produced by validating a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-error constructor for failures detected outside `validate`,
    /// e.g. a task pointing at a list the store does not know.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Submitted field values for creating or updating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskForm {
    pub name: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub ended: bool,
    pub task_list: i64,
}

impl TaskForm {
    /// Normalize and check the submitted values. Returns the form ready to
    /// persist, or the per-field errors to send back for correction.
    ///
    /// Whether `task_list` actually exists is the store's call to make.
    pub fn validate(mut self) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();

        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            errors.add("name", "this field may not be blank");
        } else if self.name.chars().count() > MAX_NAME_LEN {
            errors.add(
                "name",
                format!("ensure this value has at most {} characters", MAX_NAME_LEN),
            );
        }

        if self.task_list <= 0 {
            errors.add("task_list", "a valid task list id is required");
        }

        errors.into_result(self)
    }
}

/// Submitted field values for creating or updating a task list.
///
/// `members` is the full membership set; on update it replaces the stored
/// one rather than being merged into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListForm {
    pub name: String,
    #[serde(default)]
    pub members: Vec<i64>,
}

impl TaskListForm {
    pub fn validate(mut self) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();

        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            errors.add("name", "this field may not be blank");
        } else if self.name.chars().count() > MAX_NAME_LEN {
            errors.add(
                "name",
                format!("ensure this value has at most {} characters", MAX_NAME_LEN),
            );
        }

        self.members.sort_unstable();
        self.members.dedup();
        if self.members.is_empty() {
            errors.add("members", "the list must be shared with at least one user");
        } else if self.members.iter().any(|id| *id <= 0) {
            errors.add("members", "user ids must be positive");
        }

        errors.into_result(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_form(name: &str) -> TaskForm {
        TaskForm {
            name: name.to_string(),
            due_date: None,
            ended: false,
            task_list: 1,
        }
    }

    #[test]
    fn test_task_form_trims_name() {
        let form = task_form("  Buy milk  ").validate().unwrap();
        assert_eq!(form.name, "Buy milk");
    }

    #[test]
    fn test_task_form_rejects_blank_name() {
        let err = task_form("   ").validate().unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "name");
    }

    #[test]
    fn test_task_form_rejects_overlong_name() {
        let err = task_form(&"x".repeat(MAX_NAME_LEN + 1)).validate().unwrap_err();
        assert_eq!(err.errors[0].field, "name");

        // The bound itself is fine
        assert!(task_form(&"x".repeat(MAX_NAME_LEN)).validate().is_ok());
    }

    #[test]
    fn test_task_form_rejects_nonpositive_list_id() {
        let mut form = task_form("ok");
        form.task_list = 0;
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors[0].field, "task_list");
    }

    #[test]
    fn test_list_form_requires_members() {
        let form = TaskListForm {
            name: "Groceries".to_string(),
            members: vec![],
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors[0].field, "members");
    }

    #[test]
    fn test_list_form_dedups_members() {
        let form = TaskListForm {
            name: "Groceries".to_string(),
            members: vec![3, 1, 3, 2, 1],
        };
        let form = form.validate().unwrap();
        assert_eq!(form.members, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_form_rejects_nonpositive_member() {
        let form = TaskListForm {
            name: "Groceries".to_string(),
            members: vec![1, -4],
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors[0].field, "members");
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let form = TaskForm {
            name: "".to_string(),
            due_date: None,
            ended: false,
            task_list: -1,
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(format!("{}", err).matches(';').count(), 1);
    }
}
