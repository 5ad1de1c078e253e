use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let config = taskboard_server::config::Config::from_env()?;
    taskboard_server::web::start_web_server(config).await
}
