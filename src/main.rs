//! notifyd: notification daemon state engine.
//!
//! Wires the engine, the control socket and the DND ticker together and
//! runs them until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing_subscriber::{EnvFilter, fmt};

use notifyd_core::config::AppConfig;
use notifyd_core::error::AppError;
use notifyd_engine::{BroadcastSink, ControlServer, DndTicker, Engine};

/// Per-subscriber buffer of the event fan-out.
const EVENT_BUFFER: usize = 1024;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("NOTIFYD_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting notifyd v{}", env!("CARGO_PKG_VERSION"));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Event fan-out ────────────────────────────────────────────
    let sink = BroadcastSink::new(EVENT_BUFFER);
    let log_handle = tokio::spawn(log_events(sink.clone(), shutdown_rx.clone()));

    // ── Engine ───────────────────────────────────────────────────
    let (mut engine, handle) = Engine::new(&config, Arc::new(sink))?;
    if let Err(e) = engine.load_history().await {
        tracing::warn!("Starting with empty history: {}", e);
    }
    tracing::info!(
        "Engine ready ({} rules, {} history entries)",
        config.rules.len(),
        engine.handler().history_store().len()
    );
    let mut engine_handle = tokio::spawn(engine.run(shutdown_rx.clone()));

    // ── Control socket ───────────────────────────────────────────
    let control = ControlServer::new(&config.control, handle.clone());
    let listener = control.bind()?;
    let control_handle = tokio::spawn(control.serve(listener, shutdown_rx.clone()));

    // ── DND ticker ───────────────────────────────────────────────
    let mut ticker = DndTicker::new().await?;
    ticker.register(handle.clone()).await?;
    ticker.start().await?;
    drop(handle);

    tracing::info!("notifyd running");

    // ── Wait for a signal or a fatal engine error ────────────────
    let engine_result = tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
            tokio::time::timeout(Duration::from_secs(10), &mut engine_handle).await
        }
        result = &mut engine_handle => {
            let _ = shutdown_tx.send(true);
            Ok(result)
        }
    };

    if let Err(e) = ticker.shutdown().await {
        tracing::warn!("{}", e);
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), control_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), log_handle).await;

    match engine_result {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => return Err(AppError::internal(format!("Engine task failed: {e}"))),
        Err(_) => tracing::warn!("Engine did not stop in time"),
    }

    tracing::info!("notifyd shut down gracefully");
    Ok(())
}

/// Log everything the engine emits until shutdown.
async fn log_events(sink: BroadcastSink, mut shutdown: watch::Receiver<bool>) {
    let mut renderer = sink.subscribe_renderer();
    let mut signals = sink.subscribe_signals();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = renderer.recv() => match event {
                Ok(event) => tracing::debug!(?event, "renderer event"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event log skipped {} renderer events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            signal = signals.recv() => match signal {
                Ok(signal) => tracing::debug!(?signal, "protocol signal"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event log skipped {} signals", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
