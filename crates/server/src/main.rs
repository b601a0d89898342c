use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use voice_agent_config::{ConfigLoader, ProviderRegistry};
use voice_agent_providers::register_builtin_providers;
use voice_agent_server::{AppState, NoopHistoryStore, SessionManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let cli_arg = std::env::args().nth(1);
    let main_path = voice_agent_config::resolve_main_path(cli_arg.as_deref());
    let config = ConfigLoader::load(&main_path)?;
    let host = config.system.host.clone();
    let port = config.system.port;

    let registry = Arc::new(ProviderRegistry::new());
    register_builtin_providers(&registry);

    let sessions = Arc::new(SessionManager::new(Arc::new(NoopHistoryStore)));
    let cleanup_shutdown = sessions.start_cleanup_task();

    let state = Arc::new(AppState::new(config, main_path, registry, sessions));

    let app = Router::new()
        .route("/ws/:session_id", get(voice_agent_server::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!(%addr, "voice agent server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    let _ = cleanup_shutdown.send(true);
    Ok(())
}
