//! Impulsa API Server
//!
//! Run with: cargo run -p impulsa-web

use std::net::SocketAddr;

use tokio::signal::ctrl_c;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use impulsa_config::Config;
use impulsa_db::Database;
use impulsa_web::router::build_router;
use impulsa_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,impulsa_web=debug,impulsa_db=debug")),
        )
        .init();

    let config = Config::load()?;
    info!(environment = %config.environment, "starting FEMETE IMPULSA API");

    let db = Database::connect(&config.database).await?;
    if config.database.run_schema {
        db.initialize().await?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = AppState::new(config, db.pool().clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server listening on http://{addr}");
    info!("docs at http://{addr}/api-docs, dashboard at http://{addr}/");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
