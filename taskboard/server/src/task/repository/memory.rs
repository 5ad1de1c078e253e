use super::{TaskRepository, TaskRepositoryError};
use crate::task::Task;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Store {
    last_id: u64,
    tasks: BTreeMap<u64, Task>,
}

/// Task storage kept in process memory. IDs start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    store: RwLock<Store>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, task: Task) -> Result<Task, TaskRepositoryError> {
        let mut store = self.store.write().await;
        store.last_id += 1;
        let saved = task.with_id(store.last_id);
        store.tasks.insert(saved.id(), saved.clone());
        Ok(saved)
    }

    async fn find_by_user_id(&self, user_id: u64) -> Result<Vec<Task>, TaskRepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .tasks
            .values()
            .filter(|task| task.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_task_id(
        &self,
        task_id: u64,
        user_id: u64,
    ) -> Result<Task, TaskRepositoryError> {
        let store = self.store.read().await;
        store
            .tasks
            .get(&task_id)
            .filter(|task| task.user_id() == user_id)
            .cloned()
            .ok_or(TaskRepositoryError::NotFound(task_id))
    }

    async fn update_by_task_id(&self, task: Task) -> Result<Task, TaskRepositoryError> {
        let mut store = self.store.write().await;
        let existing = store
            .tasks
            .get_mut(&task.id())
            .filter(|existing| existing.user_id() == task.user_id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        let updated = task.with_status(existing.status());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_by_task_id(
        &self,
        task_id: u64,
        user_id: u64,
    ) -> Result<(), TaskRepositoryError> {
        let mut store = self.store.write().await;
        let owned = store
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.user_id() == user_id);
        if !owned {
            return Err(TaskRepositoryError::NotFound(task_id));
        }
        store.tasks.remove(&task_id);
        Ok(())
    }
}
