use crate::auth::CurrentUser;
use crate::task::TaskStatus;
use crate::task::repository::TaskRepositoryError;
use crate::task::request::{TaskRequest, ValidationError};
use crate::task::response::TaskJson;
use crate::task::service::TaskService;
use crate::web::api::ErrorResponse;
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use std::sync::Arc;

/// Error type for task API operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// The payload was well-formed JSON but failed validation.
    #[error("Invalid task: {0}")]
    Validation(#[from] ValidationError),
    /// The body or path could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    /// The task does not exist for the caller.
    #[error("Task with ID {0} not found")]
    NotFound(u64),
    /// Any other repository failure.
    #[error("Task storage failed: {0}")]
    Persistence(#[source] TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => TaskApiError::NotFound(task_id),
            other => TaskApiError::Persistence(other),
        }
    }
}

impl From<JsonRejection> for TaskApiError {
    fn from(rejection: JsonRejection) -> Self {
        TaskApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for TaskApiError {
    fn from(rejection: PathRejection) -> Self {
        TaskApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status_code, error_response) = match &self {
            TaskApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", err.to_string()),
            ),
            TaskApiError::MalformedRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", message.clone()),
            ),
            TaskApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", self.to_string()),
            ),
            TaskApiError::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(
                    "INTERNAL_SERVER_ERROR",
                    "An unexpected error occurred while processing your request. Please try again later.",
                ),
            ),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Binds task requests, runs them through the [`TaskService`] on behalf of
/// the caller and renders the results.
#[derive(Clone)]
pub struct TaskController {
    service: TaskService,
}

impl TaskController {
    pub fn new(service: TaskService) -> Self {
        Self { service }
    }

    /// Creates a task owned by the caller with status `new`.
    #[tracing::instrument(skip(self))]
    pub async fn save(
        &self,
        caller: &CurrentUser,
        payload: &TaskRequest,
    ) -> Result<TaskJson, TaskApiError> {
        let task = payload
            .to_domain()
            .inspect_err(|err| tracing::warn!("TaskController::save rejected payload: {}", err))?
            .with_user_id(caller.id)
            .with_status(TaskStatus::New);

        let task = self
            .service
            .save(task)
            .await
            .inspect_err(|err| tracing::error!("TaskController::save failed: {}", err))?;
        Ok(TaskJson::from(task))
    }

    /// Lists the caller's tasks.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_user_id(&self, caller: &CurrentUser) -> Result<Vec<TaskJson>, TaskApiError> {
        let tasks = self
            .service
            .find_by_user_id(caller.id)
            .await
            .inspect_err(|err| tracing::error!("TaskController::find_by_user_id failed: {}", err))?;
        Ok(TaskJson::from_collection(tasks))
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_by_task_id(
        &self,
        caller: &CurrentUser,
        task_id: u64,
    ) -> Result<TaskJson, TaskApiError> {
        let task = self
            .service
            .find_by_task_id(task_id, caller.id)
            .await
            .inspect_err(|err| tracing::error!("TaskController::find_by_task_id failed: {}", err))?;
        Ok(TaskJson::from(task))
    }

    /// Replaces title, description and deadline of one of the caller's tasks.
    #[tracing::instrument(skip(self))]
    pub async fn update_by_task_id(
        &self,
        caller: &CurrentUser,
        task_id: u64,
        payload: &TaskRequest,
    ) -> Result<TaskJson, TaskApiError> {
        let task = payload
            .to_domain()
            .inspect_err(|err| {
                tracing::warn!("TaskController::update_by_task_id rejected payload: {}", err)
            })?
            .with_id(task_id)
            .with_user_id(caller.id);

        let task = self
            .service
            .update_by_task_id(task)
            .await
            .inspect_err(|err| {
                tracing::error!("TaskController::update_by_task_id failed: {}", err)
            })?;
        Ok(TaskJson::from(task))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_by_task_id(
        &self,
        caller: &CurrentUser,
        task_id: u64,
    ) -> Result<(), TaskApiError> {
        self.service
            .delete_by_task_id(task_id, caller.id)
            .await
            .inspect_err(|err| {
                tracing::error!("TaskController::delete_by_task_id failed: {}", err)
            })?;
        Ok(())
    }
}

/// Handler for POST /api/v1/tasks - Creates a task for the caller.
#[tracing::instrument(skip(controller, payload))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = TaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Malformed or invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn save_task_handler(
    State(controller): State<Arc<TaskController>>,
    current_user: CurrentUser,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), TaskApiError> {
    let Json(payload) = payload?;
    let task = controller.save(&current_user, &payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for GET /api/v1/tasks - Lists the caller's tasks.
#[tracing::instrument(skip(controller))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = Vec<TaskJson>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(controller): State<Arc<TaskController>>,
    current_user: CurrentUser,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let tasks = controller.find_by_user_id(&current_user).await?;
    Ok(Json(tasks))
}

/// Handler for GET /api/v1/tasks/{task_id} - Returns one of the caller's tasks.
#[tracing::instrument(skip(controller, task_id))]
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}",
    params(
        ("task_id" = u64, Path, description = "ID of the task")
    ),
    responses(
        (status = 200, description = "Successfully retrieved task", body = TaskJson),
        (status = 400, description = "Malformed task ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(controller): State<Arc<TaskController>>,
    current_user: CurrentUser,
    task_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(task_id) = task_id?;
    let task = controller.find_by_task_id(&current_user, task_id).await?;
    Ok(Json(task))
}

/// Handler for PUT /api/v1/tasks/{task_id} - Updates one of the caller's tasks.
#[tracing::instrument(skip(controller, task_id, payload))]
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{task_id}",
    params(
        ("task_id" = u64, Path, description = "ID of the task")
    ),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Malformed task ID or payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(controller): State<Arc<TaskController>>,
    current_user: CurrentUser,
    task_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(task_id) = task_id?;
    let Json(payload) = payload?;
    let task = controller
        .update_by_task_id(&current_user, task_id, &payload)
        .await?;
    Ok(Json(task))
}

/// Handler for DELETE /api/v1/tasks/{task_id} - Deletes one of the caller's tasks.
#[tracing::instrument(skip(controller, task_id))]
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{task_id}",
    params(
        ("task_id" = u64, Path, description = "ID of the task")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 400, description = "Malformed task ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(controller): State<Arc<TaskController>>,
    current_user: CurrentUser,
    task_id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, TaskApiError> {
    let Path(task_id) = task_id?;
    controller.delete_by_task_id(&current_user, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the tasks API router.
pub fn create_api_router(controller: Arc<TaskController>) -> Router {
    Router::new()
        .route("/tasks", get(get_tasks_handler).post(save_task_handler))
        .route(
            "/tasks/{task_id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(controller)
}
