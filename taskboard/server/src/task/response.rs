use crate::task::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier of the task
    pub id: u64,
    /// Identifier of the owning user
    #[serde(rename = "userId")]
    pub user_id: u64,
    /// Title of the task
    pub title: String,
    /// Optional description, `null` when absent
    pub description: Option<String>,
    /// Optional deadline as Unix epoch seconds, `null` when absent
    pub deadline: Option<i64>,
    /// Lifecycle status of the task
    pub status: TaskStatus,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            user_id: task.user_id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            deadline: task.deadline().map(|deadline| deadline.timestamp()),
            status: task.status(),
        }
    }
}

impl TaskJson {
    /// Maps tasks to their JSON form, keeping their order.
    pub fn from_collection(tasks: Vec<Task>) -> Vec<TaskJson> {
        tasks.into_iter().map(TaskJson::from).collect()
    }
}
