//! Control socket server.
//!
//! Listens on a Unix socket and speaks newline-delimited JSON: one
//! [`ControlCommand`] per line in, one [`ControlResponse`] per line out.

use std::path::{Path, PathBuf};

use futures::{SinkExt, StreamExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

use notifyd_core::config::ControlConfig;
use notifyd_core::control::{ControlCommand, ControlResponse};
use notifyd_core::error::AppError;

use crate::server::EngineHandle;

/// Accepts control clients and forwards their commands to the engine.
#[derive(Debug)]
pub struct ControlServer {
    socket_path: PathBuf,
    max_request_bytes: usize,
    engine: EngineHandle,
}

impl ControlServer {
    /// Create a server for the configured socket.
    pub fn new(config: &ControlConfig, engine: EngineHandle) -> Self {
        Self {
            socket_path: config.resolved_socket_path(),
            max_request_bytes: config.max_request_bytes,
            engine,
        }
    }

    /// Socket path this server binds.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Bind the socket, replacing a stale socket file left by a previous run.
    pub fn bind(&self) -> Result<UnixListener, AppError> {
        if self.socket_path.exists() {
            debug!("Removing stale socket '{}'", self.socket_path.display());
            std::fs::remove_file(&self.socket_path)?;
        }
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        UnixListener::bind(&self.socket_path).map_err(|e| {
            AppError::with_source(
                notifyd_core::error::ErrorKind::Io,
                format!(
                    "Failed to bind control socket '{}': {e}",
                    self.socket_path.display()
                ),
                e,
            )
        })
    }

    /// Serve on an already bound listener until shutdown is signalled.
    pub async fn serve(
        self,
        listener: UnixListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), AppError> {
        info!(
            "Control socket listening on '{}'",
            self.socket_path.display()
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Control server shutting down");
                        break;
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let engine = self.engine.clone();
                        let max = self.max_request_bytes;
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, engine, max).await {
                                warn!("Control connection ended with error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept control connection: {}", e);
                    }
                },
            }
        }

        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            debug!(
                "Could not remove socket '{}': {}",
                self.socket_path.display(),
                e
            );
        }
        Ok(())
    }

    /// Bind and serve.
    pub async fn start(self, shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
        let listener = self.bind()?;
        self.serve(listener, shutdown).await
    }
}

async fn serve_connection(
    stream: UnixStream,
    engine: EngineHandle,
    max_request_bytes: usize,
) -> Result<(), AppError> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_request_bytes));

    while let Some(line) = framed.next().await {
        let line = match line {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                let err = AppError::protocol(format!(
                    "request exceeds {max_request_bytes} bytes"
                ));
                let reply = serde_json::to_string(&ControlResponse::from_error(&err))?;
                framed.send(reply).await.map_err(codec_error)?;
                return Err(err);
            }
            Err(e) => return Err(codec_error(e)),
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<ControlCommand>(&line) {
            Ok(command) => engine
                .control(command)
                .await
                .unwrap_or_else(|e| ControlResponse::from_error(&e)),
            Err(e) => {
                warn!("Invalid control command: {}", e);
                ControlResponse::from_error(&AppError::protocol(format!("invalid command: {e}")))
            }
        };

        let reply = serde_json::to_string(&reply)?;
        framed.send(reply).await.map_err(codec_error)?;
    }

    debug!("Control client disconnected");
    Ok(())
}

fn codec_error(err: LinesCodecError) -> AppError {
    match err {
        LinesCodecError::Io(e) => AppError::from(e),
        LinesCodecError::MaxLineLengthExceeded => AppError::protocol("line too long"),
    }
}
