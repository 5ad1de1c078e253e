use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod api;
pub mod repository;
pub mod request;
pub mod response;
pub mod service;

/// Lifecycle tag of a task. No transition rules are enforced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Done,
}

/// A task owned by a single user.
///
/// `id` is zero until the task has been persisted.
#[derive(Debug, Default, PartialEq, Clone, Eq)]
pub struct Task {
    id: u64,
    user_id: u64,
    title: String,
    description: Option<String>,
    deadline: Option<DateTime<Utc>>,
    status: TaskStatus,
}

impl Task {
    pub fn new(
        id: u64,
        user_id: u64,
        title: String,
        description: Option<String>,
        deadline: Option<DateTime<Utc>>,
        status: TaskStatus,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            description,
            deadline,
            status,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the ID of the owning user.
    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the task with its ID replaced.
    pub fn with_id(self, id: u64) -> Self {
        Self { id, ..self }
    }

    /// Returns the task owned by `user_id`.
    pub fn with_user_id(self, user_id: u64) -> Self {
        Self { user_id, ..self }
    }

    pub fn with_status(self, status: TaskStatus) -> Self {
        Self { status, ..self }
    }
}
