use mock_server::{serve, Casing};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let casing = match std::env::var("MOCK_CASING").as_deref() {
        Ok("pascal") => Casing::Pascal,
        _ => Casing::Camel,
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, ?casing, "Mock SkillSync API listening on /api/v1");
    serve(listener, casing).await
}
