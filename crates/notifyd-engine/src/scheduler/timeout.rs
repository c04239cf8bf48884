//! Timeout scheduler.
//!
//! Every active notification owns exactly one timer entry. An entry is
//! either armed (a sleeping task will post an [`Expiry`]) or disarmed
//! (timeout `0`, never fires). Each arm bumps a generation counter; an
//! expiry is only honoured if its generation still matches the entry, so a
//! timer that raced with a replace or close can never act on the new state.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

use notifyd_core::types::NotificationId;

/// "This notification's timer fired."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Target notification.
    pub id: NotificationId,
    /// Generation of the arm that produced this expiry.
    pub generation: u64,
}

#[derive(Debug)]
struct TimerEntry {
    generation: u64,
    deadline: Option<Instant>,
    task: Option<AbortHandle>,
}

/// Owns the expiry timers of the active set.
#[derive(Debug)]
pub struct TimeoutScheduler {
    entries: HashMap<NotificationId, TimerEntry>,
    next_generation: u64,
    expiry_tx: mpsc::UnboundedSender<Expiry>,
}

impl TimeoutScheduler {
    /// Create a scheduler posting expiries to `expiry_tx`.
    pub fn new(expiry_tx: mpsc::UnboundedSender<Expiry>) -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 1,
            expiry_tx,
        }
    }

    /// Create a scheduler together with the receiving end of its expiries.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Expiry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Arm (or re-arm) the timer of `id`. Any previous timer is cancelled
    /// first. A timeout of `0` leaves a disarmed entry that never fires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, id: NotificationId, timeout_ms: u32) -> u64 {
        self.disarm(id);

        let generation = self.next_generation;
        self.next_generation += 1;

        let (deadline, task) = if timeout_ms == 0 {
            (None, None)
        } else {
            let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
            let tx = self.expiry_tx.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                let _ = tx.send(Expiry { id, generation });
            });
            (Some(deadline), Some(handle.abort_handle()))
        };

        self.entries.insert(
            id,
            TimerEntry {
                generation,
                deadline,
                task,
            },
        );
        generation
    }

    /// Cancel and forget the timer of `id`. Returns whether an entry existed.
    pub fn disarm(&mut self, id: NotificationId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                if let Some(task) = entry.task {
                    task.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Accept an expiry if it belongs to the current arm of its
    /// notification, consuming the entry. Stale expiries return `false`.
    pub fn claim(&mut self, expiry: &Expiry) -> bool {
        match self.entries.get(&expiry.id) {
            Some(entry) if entry.generation == expiry.generation && entry.task.is_some() => {
                self.entries.remove(&expiry.id);
                true
            }
            Some(entry) => {
                debug!(
                    "Ignoring stale expiry for notification {} (generation {}, current {})",
                    expiry.id, expiry.generation, entry.generation
                );
                false
            }
            None => {
                debug!(
                    "Ignoring expiry for notification {} with no timer entry",
                    expiry.id
                );
                false
            }
        }
    }

    /// Whether `id` has an entry that will fire.
    pub fn is_armed(&self, id: NotificationId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.task.is_some())
    }

    /// Whether `id` has an entry at all (armed or disarmed).
    pub fn has_entry(&self, id: NotificationId) -> bool {
        self.entries.contains_key(&id)
    }

    /// When the timer of `id` fires, if armed.
    pub fn deadline(&self, id: NotificationId) -> Option<Instant> {
        self.entries.get(&id).and_then(|e| e.deadline)
    }

    /// Current generation of `id`'s entry.
    pub fn generation(&self, id: NotificationId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.generation)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for TimeoutScheduler {
    fn drop(&mut self) {
        for entry in self.entries.values() {
            if let Some(task) = &entry.task {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_timer_fires_at_deadline() {
        let (mut scheduler, mut rx) = TimeoutScheduler::channel();
        let id = NotificationId(1);
        let generation = scheduler.arm(id, 1000);
        assert!(scheduler.is_armed(id));

        tokio::time::advance(Duration::from_millis(999)).await;
        settle().await;
        assert!(rx.try_recv().is_err());

        let expiry = rx.recv().await.expect("timer should fire");
        assert_eq!(expiry, Expiry { id, generation });
        assert!(scheduler.claim(&expiry));
        assert!(!scheduler.has_entry(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_never_fires() {
        let (mut scheduler, mut rx) = TimeoutScheduler::channel();
        let id = NotificationId(2);
        scheduler.arm(id, 0);
        assert!(scheduler.has_entry(id));
        assert!(!scheduler.is_armed(id));
        assert_eq!(scheduler.deadline(id), None);

        tokio::time::advance(Duration::from_secs(24 * 3600)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_invalidates_previous_generation() {
        let (mut scheduler, mut rx) = TimeoutScheduler::channel();
        let id = NotificationId(3);
        let first = scheduler.arm(id, 100);
        let second = scheduler.arm(id, 500);
        assert!(second > first);
        assert_eq!(scheduler.len(), 1);

        // The first task was aborted, so nothing arrives at 100ms.
        tokio::time::advance(Duration::from_millis(150)).await;
        settle().await;
        assert!(rx.try_recv().is_err());

        // A delayed event from the first arm is still rejected.
        assert!(!scheduler.claim(&Expiry {
            id,
            generation: first
        }));
        assert!(scheduler.is_armed(id));

        let expiry = rx.recv().await.expect("second arm fires");
        assert_eq!(expiry.generation, second);
        assert!(scheduler.claim(&expiry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels() {
        let (mut scheduler, mut rx) = TimeoutScheduler::channel();
        let id = NotificationId(4);
        let generation = scheduler.arm(id, 100);
        assert!(scheduler.disarm(id));
        assert!(!scheduler.disarm(id));

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
        assert!(!scheduler.claim(&Expiry { id, generation }));
    }

    #[tokio::test]
    async fn test_claim_of_disarmed_entry_is_rejected() {
        let (mut scheduler, _rx) = TimeoutScheduler::channel();
        let id = NotificationId(5);
        let generation = scheduler.arm(id, 0);
        assert!(!scheduler.claim(&Expiry { id, generation }));
        assert!(scheduler.has_entry(id));
    }
}
