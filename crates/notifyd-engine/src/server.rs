//! The engine loop.
//!
//! One task owns the [`RequestHandler`]. Protocol requests, control
//! commands and DND ticks arrive on a bounded command channel, timer
//! expiries on the scheduler's channel; `select!` takes them one at a time,
//! so state transitions never interleave.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, info, warn};

use notifyd_core::config::AppConfig;
use notifyd_core::control::{ControlCommand, ControlResponse};
use notifyd_core::error::AppError;
use notifyd_core::types::{NotificationId, NotifyRequest};

use crate::control::execute;
use crate::dnd::{Clock, LocalClock};
use crate::handler::RequestHandler;
use crate::history::persist;
use crate::scheduler::Expiry;
use crate::sink::EventSink;

/// Depth of the command queue.
const COMMAND_BUFFER: usize = 256;

/// A unit of work for the engine loop.
#[derive(Debug)]
pub enum EngineCommand {
    /// Protocol `Notify`.
    Notify {
        /// The raw request.
        request: NotifyRequest,
        /// Receives the assigned identity.
        reply: oneshot::Sender<Result<NotificationId, AppError>>,
    },
    /// Protocol `CloseNotification`.
    Close {
        /// Target notification.
        id: NotificationId,
        /// Receives the outcome.
        reply: oneshot::Sender<Result<(), AppError>>,
    },
    /// A control-client command.
    Control {
        /// The command.
        command: ControlCommand,
        /// Receives the reply.
        reply: oneshot::Sender<ControlResponse>,
    },
    /// Re-evaluate the DND schedule.
    DndTick,
}

/// Cloneable entry point into a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineCommand,
    ) -> Result<T, AppError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| AppError::service_unavailable("notification engine is not running"))?;
        rx.await
            .map_err(|_| AppError::service_unavailable("notification engine stopped"))
    }

    /// Submit a `Notify` request.
    pub async fn notify(&self, request: NotifyRequest) -> Result<NotificationId, AppError> {
        self.request(|reply| EngineCommand::Notify { request, reply })
            .await?
    }

    /// Submit a `CloseNotification` request.
    pub async fn close_notification(&self, id: NotificationId) -> Result<(), AppError> {
        self.request(|reply| EngineCommand::Close { id, reply })
            .await?
    }

    /// Run a control command.
    pub async fn control(&self, command: ControlCommand) -> Result<ControlResponse, AppError> {
        self.request(|reply| EngineCommand::Control { command, reply })
            .await
    }

    /// Ask the engine to re-evaluate the DND schedule.
    pub async fn tick_dnd(&self) -> Result<(), AppError> {
        self.tx
            .send(EngineCommand::DndTick)
            .await
            .map_err(|_| AppError::service_unavailable("notification engine is not running"))
    }
}

/// The single owner of notification state.
#[derive(Debug)]
pub struct Engine {
    handler: RequestHandler,
    commands: mpsc::Receiver<EngineCommand>,
    expiries: mpsc::UnboundedReceiver<Expiry>,
    history_path: Option<PathBuf>,
}

impl Engine {
    /// Build an engine reading the system clock.
    pub fn new(
        config: &AppConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<(Self, EngineHandle), AppError> {
        Self::with_clock(config, sink, Arc::new(LocalClock))
    }

    /// Build an engine with an explicit clock for DND evaluation.
    pub fn with_clock(
        config: &AppConfig,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, EngineHandle), AppError> {
        let (expiry_tx, expiries) = mpsc::unbounded_channel();
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let handler = RequestHandler::new(config, sink, clock, expiry_tx)?;

        let history_path = if config.history.enabled {
            config.history.path.clone()
        } else {
            None
        };

        Ok((
            Self {
                handler,
                commands,
                expiries,
                history_path,
            },
            EngineHandle { tx },
        ))
    }

    /// Restore the persisted history, if a history file is configured.
    pub async fn load_history(&mut self) -> Result<(), AppError> {
        if let Some(path) = &self.history_path {
            let entries = persist::load(path).await?;
            self.handler.history_store_mut().restore(entries);
        }
        Ok(())
    }

    /// Read access to the handler, for inspection before `run`.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Process events until shutdown is signalled or every handle is
    /// dropped. Returns an error only for fatal conditions.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
        info!("Notification engine started");

        let outcome = loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Notification engine received shutdown signal");
                        break Ok(());
                    }
                }
                Some(expiry) = self.expiries.recv() => {
                    self.handler.on_expiry(expiry);
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        info!("All engine handles dropped");
                        break Ok(());
                    };
                    if let Err(e) = self.dispatch(command) {
                        error!("Fatal engine error: {}", e);
                        break Err(e);
                    }
                }
            }
        };

        self.persist_history().await;
        info!("Notification engine stopped");
        outcome
    }

    /// Apply one command. Only fatal errors are returned; everything else
    /// goes back to the caller through its reply channel.
    fn dispatch(&mut self, command: EngineCommand) -> Result<(), AppError> {
        match command {
            EngineCommand::Notify { request, reply } => {
                let result = self.handler.notify(request);
                let fatal = fatal(&result);
                let _ = reply.send(result);
                fatal
            }
            EngineCommand::Close { id, reply } => {
                let _ = reply.send(self.handler.close_by_app(id));
                Ok(())
            }
            EngineCommand::Control { command, reply } => {
                let result = execute(&mut self.handler, command);
                let fatal = fatal(&result);
                let _ = reply.send(ControlResponse::from_result(result));
                fatal
            }
            EngineCommand::DndTick => {
                self.handler.tick_dnd();
                Ok(())
            }
        }
    }

    async fn persist_history(&self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Err(e) = persist::save(path, self.handler.history_store()).await {
            warn!("Failed to save history to '{}': {}", path.display(), e);
        }
    }
}

fn fatal<T>(result: &Result<T, AppError>) -> Result<(), AppError> {
    match result {
        Err(e) if e.kind.is_fatal() => Err(e.clone()),
        _ => Ok(()),
    }
}
