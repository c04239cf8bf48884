//! Control socket client.

use std::path::Path;

use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::debug;

use notifyd_core::control::{ControlCommand, ControlData, ControlResponse};
use notifyd_core::error::{AppError, ErrorKind};

/// One connection to the daemon.
pub struct ControlClient {
    framed: Framed<UnixStream, LinesCodec>,
}

impl ControlClient {
    /// Connect to the daemon's control socket.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        let stream = UnixStream::connect(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ServiceUnavailable,
                format!(
                    "Cannot reach notifyd at '{}', is the daemon running?",
                    path.display()
                ),
                e,
            )
        })?;
        debug!("Connected to '{}'", path.display());
        Ok(Self {
            framed: Framed::new(stream, LinesCodec::new()),
        })
    }

    /// Send one command and wait for its reply.
    pub async fn send(&mut self, command: ControlCommand) -> Result<ControlResponse, AppError> {
        let line = serde_json::to_string(&command)?;
        self.framed.send(line).await.map_err(codec_error)?;

        let reply = self
            .framed
            .next()
            .await
            .ok_or_else(|| AppError::protocol("daemon closed the connection without replying"))?
            .map_err(codec_error)?;
        Ok(serde_json::from_str(&reply)?)
    }

    /// Send one command; NotFound and error replies become `Err`.
    pub async fn request(&mut self, command: ControlCommand) -> Result<ControlData, AppError> {
        self.send(command).await?.into_result()
    }
}

fn codec_error(err: LinesCodecError) -> AppError {
    match err {
        LinesCodecError::Io(e) => AppError::from(e),
        LinesCodecError::MaxLineLengthExceeded => AppError::protocol("reply line too long"),
    }
}

/// Reply of an unexpected shape.
pub fn unexpected(data: ControlData) -> AppError {
    AppError::protocol(format!("unexpected reply from daemon: {data:?}"))
}
