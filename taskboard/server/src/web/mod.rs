use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthState;
use crate::config::Config;
use crate::task::api::v1::TaskController;
use crate::task::repository::{SeaOrmTaskRepository, TaskRepository};
use crate::task::service::TaskService;

pub mod api;

/// Builds the complete application router around a task repository.
pub fn create_app(auth_state: Arc<AuthState>, repository: Arc<dyn TaskRepository>) -> axum::Router {
    let controller = Arc::new(TaskController::new(TaskService::new(repository)));

    axum::Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api::create_api_router(auth_state, controller))
        .layer(
            ServiceBuilder::new()
                .layer(SetSensitiveRequestHeadersLayer::new([
                    axum::http::header::AUTHORIZATION,
                ]))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let auth_state = Arc::new(AuthState::from_config(&config));
    let repository = Arc::new(SeaOrmTaskRepository::new(Arc::new(db)));

    let app = create_app(auth_state, repository);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
