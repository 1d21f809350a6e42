//! dclone-bot binary entrypoint wiring the upstream clients, the chat sink, the scheduler and the HTTP surface.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use dclone_bot::{
    config::{AppConfig, REQUEST_TIMEOUT},
    notify::DiscordSink,
    routes,
    services::scheduler::Scheduler,
    state::{AppState, Collaborators, SharedState},
    upstream::{StatusClient, WalkClient, WalkSource},
};
use tokio::{net::TcpListener, sync::watch};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    info!(
        filter = %config.filter,
        threshold = config.threshold,
        reports = config.reports,
        "tracking dclone progress"
    );

    let status = StatusClient::new(&config.status_api_url, REQUEST_TIMEOUT)
        .context("building status client")?;
    let walks = match &config.walks {
        Some(walk_config) => Some(Arc::new(
            WalkClient::new(
                &walk_config.api_url,
                &walk_config.token,
                &walk_config.contact,
                REQUEST_TIMEOUT,
            )
            .context("building walk client")?,
        ) as Arc<dyn WalkSource>),
        None => None,
    };
    let sink = DiscordSink::new(
        &config.discord.api_url,
        &config.discord.token,
        REQUEST_TIMEOUT,
    )
    .context("building chat sink")?;

    let port = config.port;
    let app_state = AppState::new(
        config,
        Collaborators {
            status: Arc::new(status),
            walks,
            sink: Arc::new(sink),
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let app = build_router(app_state.clone());
    let server = tokio::spawn(
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(wait_for(shutdown_rx.clone()))
            .into_future(),
    );

    let scheduler = tokio::select! {
        started = Scheduler::start(app_state) => {
            Some(started.context("chat channel rejected the bot")?)
        }
        _ = wait_for(shutdown_rx.clone()) => None,
    };

    wait_for(shutdown_rx).await;
    info!("shutdown requested");
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }

    match server.await {
        Ok(result) => result.context("serving axum")?,
        Err(err) => warn!(error = %err, "server task ended abnormally"),
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve once the shutdown flag flips.
async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
