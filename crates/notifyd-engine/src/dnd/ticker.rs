//! Periodic DND schedule evaluation.
//!
//! Schedule windows are minute-granular, so a cron job at the top of every
//! minute is enough to notice every boundary. The job only posts a tick; the
//! evaluation itself happens on the engine loop.

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};

use notifyd_core::error::AppError;

use crate::server::EngineHandle;

/// Every minute, on the minute.
const TICK_SCHEDULE: &str = "0 * * * * *";

/// Cron-driven DND ticker.
pub struct DndTicker {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for DndTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DndTicker").finish()
    }
}

impl DndTicker {
    /// Create the underlying scheduler.
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create DND scheduler: {e}")))?;
        Ok(Self { scheduler })
    }

    /// Register the per-minute tick against `engine`.
    pub async fn register(&self, engine: EngineHandle) -> Result<(), AppError> {
        let job = Job::new_async(TICK_SCHEDULE, move |_uuid, _lock| {
            let engine = engine.clone();
            Box::pin(async move {
                debug!("DND tick");
                if let Err(e) = engine.tick_dnd().await {
                    warn!("Failed to deliver DND tick: {}", e);
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create DND tick job: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add DND tick job: {e}")))?;

        info!("Registered: dnd_tick (every minute)");
        Ok(())
    }

    /// Start ticking.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start DND scheduler: {e}")))?;
        info!("DND ticker started");
        Ok(())
    }

    /// Stop ticking.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down DND scheduler: {e}")))?;
        info!("DND ticker shut down");
        Ok(())
    }
}
