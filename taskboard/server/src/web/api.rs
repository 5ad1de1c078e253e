use std::sync::Arc;

use crate::{
    auth::{self, AuthState},
    task::{self, api::v1::TaskController},
};

use axum::{
    Json, Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// JSON response for API errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error code
    pub error: String,
    /// Human readable description
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        task::api::v1::save_task_handler,
        task::api::v1::get_tasks_handler,
        task::api::v1::get_task_handler,
        task::api::v1::update_task_handler,
        task::api::v1::delete_task_handler,
    ),
    components(schemas(
        task::request::TaskRequest,
        task::response::TaskJson,
        task::TaskStatus,
        ErrorResponse,
    )),
    modifiers(&BearerSecurity),
    tags((name = "Tasks", description = "Task management for the authenticated user"))
)]
pub struct ApiDoc;

/// Handler for GET /api-docs/openapi.json.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(auth_state: Arc<AuthState>, controller: Arc<TaskController>) -> Router {
    let tasks_router = task::api::v1::create_api_router(controller);
    let protected_routes = tasks_router
        .layer(ServiceBuilder::new().layer(from_fn(auth::api::v1::require_auth_middleware)));
    Router::new()
        .nest("/api/v1", protected_routes)
        .route("/api-docs/openapi.json", get(openapi_handler))
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            auth_state,
            auth::api::v1::auth_user_middleware,
        )))
}
