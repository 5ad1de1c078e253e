use crate::task::Task;
use crate::task::repository::{TaskRepository, TaskRepositoryError};
use std::sync::Arc;

/// Application service for tasks. Forwards every call to the repository and
/// logs failures before handing them back unchanged.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Persists a new task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Task` with its assigned ID, or the repository error.
    #[tracing::instrument(skip(self))]
    pub async fn save(&self, task: Task) -> Result<Task, TaskRepositoryError> {
        self.repository
            .save(task)
            .await
            .inspect_err(|err| tracing::error!("TaskService::save failed: {}", err))
    }

    /// Retrieves all tasks owned by a user. No tasks is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_user_id(&self, user_id: u64) -> Result<Vec<Task>, TaskRepositoryError> {
        self.repository
            .find_by_user_id(user_id)
            .await
            .inspect_err(|err| tracing::error!("TaskService::find_by_user_id failed: {}", err))
    }

    /// Retrieves a single task of a user by its ID.
    ///
    /// # Arguments
    ///
    /// * `task_id` - The ID of the task.
    /// * `user_id` - The ID of the user the task must belong to.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_task_id(
        &self,
        task_id: u64,
        user_id: u64,
    ) -> Result<Task, TaskRepositoryError> {
        self.repository
            .find_by_task_id(task_id, user_id)
            .await
            .inspect_err(|err| tracing::error!("TaskService::find_by_task_id failed: {}", err))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_by_task_id(&self, task: Task) -> Result<Task, TaskRepositoryError> {
        self.repository
            .update_by_task_id(task)
            .await
            .inspect_err(|err| tracing::error!("TaskService::update_by_task_id failed: {}", err))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_by_task_id(
        &self,
        task_id: u64,
        user_id: u64,
    ) -> Result<(), TaskRepositoryError> {
        self.repository
            .delete_by_task_id(task_id, user_id)
            .await
            .inspect_err(|err| tracing::error!("TaskService::delete_by_task_id failed: {}", err))
    }
}
