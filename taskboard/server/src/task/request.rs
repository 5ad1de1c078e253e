use crate::task::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

/// JSON payload accepted when creating or updating a task.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct TaskRequest {
    /// Title of the task, must not be empty
    #[serde(default)]
    pub title: Option<String>,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional deadline as Unix epoch seconds
    #[serde(default)]
    pub deadline: Option<u64>,
}

/// Error raised when a request payload cannot be turned into a task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{field}` is required")]
    Required { field: &'static str },
    #[error("field `{field}` must not be empty")]
    Empty { field: &'static str },
    #[error("field `{field}` is out of range")]
    OutOfRange { field: &'static str },
}

impl TaskRequest {
    /// Validates the payload and converts it into a task that has not been
    /// persisted yet. Ownership and status are left for the caller to set.
    pub fn to_domain(&self) -> Result<Task, ValidationError> {
        let title = match self.title.as_deref() {
            None => return Err(ValidationError::Required { field: "title" }),
            Some("") => return Err(ValidationError::Empty { field: "title" }),
            Some(title) => title.to_string(),
        };

        let deadline = self.deadline.map(epoch_seconds_to_timestamp).transpose()?;

        Ok(Task::new(
            0,
            0,
            title,
            self.description.clone(),
            deadline,
            TaskStatus::default(),
        ))
    }
}

fn epoch_seconds_to_timestamp(seconds: u64) -> Result<DateTime<Utc>, ValidationError> {
    i64::try_from(seconds)
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .ok_or(ValidationError::OutOfRange { field: "deadline" })
}
