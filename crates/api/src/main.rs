use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use studynudge_api::config::ServerConfig;
use studynudge_api::router::build_app_router;
use studynudge_api::state::AppState;
use studynudge_db::PgUserStore;
use studynudge_engine::{NudgeEngine, NudgeService};
use studynudge_events::{NtfyDelivery, NudgeScheduler};
use studynudge_leetcode::LeetCodeClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "studynudge_api=debug,studynudge_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    let pool = studynudge_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    studynudge_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    studynudge_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let source = LeetCodeClient::new(config.leetcode_graphql_url.clone())
        .context("Failed to build question source client")?;
    let dispatcher = NtfyDelivery::new(config.ntfy_base_url.clone())
        .context("Failed to build notification client")?;

    let engine = NudgeEngine::new(Arc::new(source), Arc::new(dispatcher), config.nudge_config());
    let service = Arc::new(NudgeService::new(engine, Arc::new(PgUserStore::new(pool))));

    // Periodic trigger: daily resets and scheduled reminders.
    let scheduler_cancel = CancellationToken::new();
    let scheduler_handle = if config.scheduler_enabled {
        let scheduler = NudgeScheduler::new(
            Arc::clone(&service),
            config.scheduler_interval(),
            config.max_concurrent_evaluations,
        );
        let cancel = scheduler_cancel.clone();
        tracing::info!(
            interval_secs = config.scheduler_interval_secs,
            "Nudge scheduler started",
        );
        Some(tokio::spawn(async move { scheduler.run(cancel).await }))
    } else {
        tracing::info!("Nudge scheduler disabled");
        None
    };

    let state = AppState::new(config.clone(), service);
    let app = build_app_router(state, &config).context("Failed to build router")?;

    let addr = SocketAddr::new(
        config
            .host
            .parse()
            .with_context(|| format!("Invalid HOST '{}'", config.host))?,
        config.port,
    );
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped accepting connections, cleaning up");

    scheduler_cancel.cancel();
    if let Some(handle) = scheduler_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Nudge scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). If a handler cannot
/// be installed, that branch never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
