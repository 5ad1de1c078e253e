use super::{TaskRepository, TaskRepositoryError};
use crate::entities::task;
use crate::task::{Task, TaskStatus};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;

/// Task storage backed by the `tasks` table.
#[derive(Clone, Debug)]
pub struct SeaOrmTaskRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTaskRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// IDs above `i64::MAX` cannot be stored in a BIGINT column.
fn column_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

/// Resolves the column values of an owned task, or `NotFound` when either ID
/// cannot exist in storage.
fn owned_task_key(task_id: u64, user_id: u64) -> Result<(i64, i64), TaskRepositoryError> {
    column_id(task_id)
        .zip(column_id(user_id))
        .ok_or(TaskRepositoryError::NotFound(task_id))
}

impl From<task::Status> for TaskStatus {
    fn from(status: task::Status) -> Self {
        match status {
            task::Status::New => TaskStatus::New,
            task::Status::InProgress => TaskStatus::InProgress,
            task::Status::Done => TaskStatus::Done,
        }
    }
}

impl From<TaskStatus> for task::Status {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::New => task::Status::New,
            TaskStatus::InProgress => task::Status::InProgress,
            TaskStatus::Done => task::Status::Done,
        }
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id as u64,
            model.user_id as u64,
            model.title,
            model.description,
            model.deadline,
            model.status.into(),
        )
    }
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    #[tracing::instrument(skip(self))]
    async fn save(&self, task: Task) -> Result<Task, TaskRepositoryError> {
        let user_id = column_id(task.user_id()).ok_or_else(|| {
            DbErr::Custom(format!("user ID {} is out of range", task.user_id()))
        })?;
        let active_model = task::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            title: ActiveValue::Set(task.title().to_string()),
            description: ActiveValue::Set(task.description().map(str::to_string)),
            deadline: ActiveValue::Set(task.deadline()),
            status: ActiveValue::Set(task.status().into()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db.as_ref()).await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_user_id(&self, user_id: u64) -> Result<Vec<Task>, TaskRepositoryError> {
        let Some(user_id) = column_id(user_id) else {
            return Ok(Vec::new());
        };
        let tasks = task::Entity::find()
            .filter(task::Column::UserId.eq(user_id))
            .order_by_asc(task::Column::Id)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_task_id(
        &self,
        task_id: u64,
        user_id: u64,
    ) -> Result<Task, TaskRepositoryError> {
        let (id, owner) = owned_task_key(task_id, user_id)?;
        task::Entity::find_by_id(id)
            .filter(task::Column::UserId.eq(owner))
            .one(self.db.as_ref())
            .await?
            .map(Task::from)
            .ok_or(TaskRepositoryError::NotFound(task_id))
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_task_id(&self, task: Task) -> Result<Task, TaskRepositoryError> {
        let (id, owner) = owned_task_key(task.id(), task.user_id())?;

        // Status is left NotSet so the stored value survives the update.
        let active_model = task::ActiveModel {
            id: ActiveValue::Unchanged(id),
            title: ActiveValue::Set(task.title().to_string()),
            description: ActiveValue::Set(task.description().map(str::to_string)),
            deadline: ActiveValue::Set(task.deadline()),
            updated_at: ActiveValue::Set(chrono::Utc::now()),
            ..Default::default()
        };
        let updated_model = task::Entity::update(active_model)
            .filter(task::Column::UserId.eq(owner))
            .exec(self.db.as_ref())
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => TaskRepositoryError::NotFound(task.id()),
                other => TaskRepositoryError::Database(other),
            })?;

        Ok(Task::from(updated_model))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_task_id(
        &self,
        task_id: u64,
        user_id: u64,
    ) -> Result<(), TaskRepositoryError> {
        let (id, owner) = owned_task_key(task_id, user_id)?;
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::UserId.eq(owner))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(TaskRepositoryError::NotFound(task_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn model(id: i64, user_id: i64, title: &str) -> task::Model {
        task::Model {
            id,
            user_id,
            title: title.to_string(),
            description: None,
            deadline: None,
            status: task::Status::New,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn repository(db: DatabaseConnection) -> SeaOrmTaskRepository {
        SeaOrmTaskRepository::new(Arc::new(db))
    }

    #[tokio::test]
    async fn can_save_task() {
        let stored = task::Model {
            description: Some("2 litres".to_string()),
            deadline: DateTime::from_timestamp(0, 0),
            ..model(1, 42, "Buy milk")
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();

        let saved = repository(db)
            .save(Task::new(
                0,
                42,
                "Buy milk".to_string(),
                Some("2 litres".to_string()),
                DateTime::from_timestamp(0, 0),
                TaskStatus::New,
            ))
            .await
            .unwrap();

        assert_eq!(
            saved,
            Task::new(
                1,
                42,
                "Buy milk".to_string(),
                Some("2 litres".to_string()),
                Some(DateTime::<Utc>::UNIX_EPOCH),
                TaskStatus::New,
            )
        );
    }

    #[tokio::test]
    async fn can_find_tasks_by_user_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, 42, "first"), model(2, 42, "second")]])
            .into_connection();

        let tasks = repository(db).find_by_user_id(42).await.unwrap();

        let titles: Vec<&str> = tasks.iter().map(Task::title).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn returns_empty_list_for_user_without_tasks() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<task::Model>::new()])
            .into_connection();

        let tasks = repository(db).find_by_user_id(42).await.unwrap();

        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn reports_missing_task_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<task::Model>::new()])
            .into_connection();

        let result = repository(db).find_by_task_id(9, 42).await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound(9))));
    }

    #[tokio::test]
    async fn can_update_task_fields() {
        let updated = task::Model {
            status: task::Status::InProgress,
            ..model(3, 42, "after")
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![updated]])
            .into_connection();

        let task = repository(db)
            .update_by_task_id(Task::new(
                3,
                42,
                "after".to_string(),
                None,
                None,
                TaskStatus::New,
            ))
            .await
            .unwrap();

        assert_eq!(task.id(), 3);
        assert_eq!(task.title(), "after");
        assert_eq!(task.status(), TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn reports_update_of_missing_task_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<task::Model>::new()])
            .into_connection();

        let result = repository(db)
            .update_by_task_id(Task::new(3, 42, "x".to_string(), None, None, TaskStatus::New))
            .await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound(3))));
    }

    #[tokio::test]
    async fn can_delete_task() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = repository(db).delete_by_task_id(3, 42).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn reports_delete_of_missing_task_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = repository(db).delete_by_task_id(3, 42).await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound(3))));
    }

    #[tokio::test]
    async fn propagates_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = repository(db).find_by_user_id(42).await;

        assert!(matches!(result, Err(TaskRepositoryError::Database(_))));
    }

    fn shared(db: MockDatabase) -> Arc<DatabaseConnection> {
        Arc::new(db.into_connection())
    }

    fn executed_statements(db: Arc<DatabaseConnection>) -> Vec<Statement> {
        Arc::try_unwrap(db)
            .expect("connection is still shared")
            .into_transaction_log()
            .iter()
            .flat_map(|transaction| transaction.statements().to_vec())
            .collect()
    }

    fn assert_scoped_to_owner(statement: &Statement, user_id: i64) {
        assert!(
            statement.sql.contains(r#""tasks"."user_id" = $"#),
            "missing owner filter: {}",
            statement.sql
        );
        let values = statement.values.as_ref().expect("statement has no values");
        assert!(values.0.contains(&Value::BigInt(Some(user_id))));
    }

    #[tokio::test]
    async fn filters_task_lookup_by_owner() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<task::Model>::new()]),
        );

        let result = SeaOrmTaskRepository::new(db.clone())
            .find_by_task_id(3, 42)
            .await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound(3))));
        let statements = executed_statements(db);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.starts_with("SELECT"));
        assert_scoped_to_owner(&statements[0], 42);
    }

    #[tokio::test]
    async fn filters_task_listing_by_owner() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<task::Model>::new()]),
        );

        SeaOrmTaskRepository::new(db.clone())
            .find_by_user_id(42)
            .await
            .unwrap();

        let statements = executed_statements(db);
        assert_eq!(statements.len(), 1);
        assert_scoped_to_owner(&statements[0], 42);
    }

    #[tokio::test]
    async fn filters_task_update_by_owner() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<task::Model>::new()]),
        );

        let result = SeaOrmTaskRepository::new(db.clone())
            .update_by_task_id(Task::new(3, 42, "x".to_string(), None, None, TaskStatus::New))
            .await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound(3))));
        let statements = executed_statements(db);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.starts_with("UPDATE"));
        assert!(!statements[0].sql.contains(r#""status" = $"#));
        assert_scoped_to_owner(&statements[0], 42);
    }

    #[tokio::test]
    async fn filters_task_deletion_by_owner() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]));

        let result = SeaOrmTaskRepository::new(db.clone())
            .delete_by_task_id(3, 42)
            .await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound(3))));
        let statements = executed_statements(db);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.starts_with("DELETE"));
        assert_scoped_to_owner(&statements[0], 42);
    }

    #[tokio::test]
    async fn treats_ids_beyond_column_range_as_not_found() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres));
        let repository = SeaOrmTaskRepository::new(db.clone());

        let found = repository.find_by_task_id(u64::MAX, 42).await;
        let deleted = repository.delete_by_task_id(3, u64::MAX).await;
        let listed = repository.find_by_user_id(u64::MAX).await.unwrap();
        drop(repository);

        assert!(matches!(found, Err(TaskRepositoryError::NotFound(u64::MAX))));
        assert!(matches!(deleted, Err(TaskRepositoryError::NotFound(3))));
        assert!(listed.is_empty());
        assert!(executed_statements(db).is_empty());
    }
}
