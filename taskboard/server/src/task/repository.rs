//! Persistence contract for tasks and its implementations.

use crate::task::Task;
use async_trait::async_trait;

mod memory;
mod postgres;

pub use memory::InMemoryTaskRepository;
pub use postgres::SeaOrmTaskRepository;

/// Error type for TaskRepository operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskRepositoryError {
    /// The task does not exist or is not owned by the requesting user.
    #[error("Task with ID {0} not found")]
    NotFound(u64),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Storage of tasks. Every lookup by task ID is scoped to the owning user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a new task and returns it with its assigned ID.
    async fn save(&self, task: Task) -> Result<Task, TaskRepositoryError>;

    /// Returns every task owned by `user_id`, empty when there are none.
    async fn find_by_user_id(&self, user_id: u64) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Returns the task with `task_id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no such task exists.
    async fn find_by_task_id(&self, task_id: u64, user_id: u64)
    -> Result<Task, TaskRepositoryError>;

    /// Replaces title, description and deadline of the task matched by the
    /// ID and owner of `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no such task exists.
    async fn update_by_task_id(&self, task: Task) -> Result<Task, TaskRepositoryError>;

    /// Removes the task with `task_id` owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no such task exists.
    async fn delete_by_task_id(&self, task_id: u64, user_id: u64)
    -> Result<(), TaskRepositoryError>;
}
