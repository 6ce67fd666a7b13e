//!  src/util/debounce.rs
//!  ===================================================================
//!  Trailing-edge debounce for rapidly changing values (search input).
//!
//!  • Every `submit` restarts the quiet period; only the latest value is
//!    ever emitted.
//!  • Uses `tokio::time::sleep_until` tasks – superseded sleepers are
//!    aborted, and a generation counter stops a sleeper that already woke
//!    from emitting a stale value.
//!  • Dropping the `Debouncer` cancels the pending emission.

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, trace};

/* ======================== DebounceConfig ============================ */

#[derive(Debug, Clone)]
pub struct DebounceConfig {
    pub delay: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::search_input()
    }
}

impl DebounceConfig {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Quick config for search input debouncing
    #[must_use]
    pub const fn search_input() -> Self {
        Self {
            delay: Duration::from_millis(300),
        }
    }
}

/* ============================ Debouncer ============================ */

/// Pending state shared with the sleeper task.
struct Slot<T> {
    generation: u64,
    pending: Option<T>,
    sleeper: Option<JoinHandle<()>>,
}

pub struct Debouncer<T> {
    cfg: DebounceConfig,
    slot: Arc<Mutex<Slot<T>>>,
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a new debouncer and its Rx endpoint
    #[must_use]
    pub fn new(cfg: DebounceConfig) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let deb = Self {
            cfg,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                pending: None,
                sleeper: None,
            })),
            tx,
        };
        (deb, rx)
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.cfg.delay
    }

    /// Submit a value; it is emitted once no newer value arrives for `delay`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, value: T) {
        let deadline = Instant::now() + self.cfg.delay;
        let mut slot = self.slot.lock();

        slot.generation = slot.generation.wrapping_add(1);
        slot.pending = Some(value);

        if let Some(handle) = slot.sleeper.take() {
            handle.abort();
        }

        trace!(
            generation = slot.generation,
            delay_ms = self.cfg.delay.as_millis() as u64,
            "Debouncer restarted quiet period"
        );

        let generation = slot.generation;
        let slot_ptr = Arc::clone(&self.slot);
        let tx = self.tx.clone();

        slot.sleeper = Some(tokio::spawn(async move {
            sleep_until(deadline).await;

            let mut slot = slot_ptr.lock();
            if slot.generation != generation {
                return;
            }
            slot.sleeper = None;
            if let Some(value) = slot.pending.take() {
                debug!(generation, "Triggering trailing edge");
                let _ = tx.send(value);
            }
        }));
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.pending = None;
        if let Some(handle) = slot.sleeper.take() {
            trace!("Debouncer cancelled pending emission");
            handle.abort();
        }
    }

    /// Emit the pending value now instead of waiting out the delay.
    pub fn flush(&self) {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(handle) = slot.sleeper.take() {
            handle.abort();
        }
        if let Some(value) = slot.pending.take() {
            debug!("Flushing pending debounced value");
            let _ = self.tx.send(value);
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.pending = None;
        if let Some(handle) = slot.sleeper.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn debouncer(ms: u64) -> (Debouncer<String>, mpsc::UnboundedReceiver<String>) {
        Debouncer::new(DebounceConfig::new(Duration::from_millis(ms)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_settles_once_on_last_value() {
        let (deb, mut rx) = debouncer(300);

        for term in ["e", "en", "eng", "engi"] {
            deb.submit(term.to_string());
            sleep(Duration::from_millis(100)).await;
            assert!(rx.try_recv().is_err(), "emitted mid-burst");
        }

        // 100ms since the last submit; settle after another 200ms
        sleep(Duration::from_millis(199)).await;
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().unwrap(), "engi");

        sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err(), "emitted more than once");
        assert!(!deb.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_before_delay_discards_value() {
        let (deb, mut rx) = debouncer(300);

        deb.submit("pending".to_string());
        sleep(Duration::from_millis(150)).await;
        drop(deb);

        sleep(Duration::from_millis(500)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_value() {
        let (deb, mut rx) = debouncer(300);

        deb.submit("typed".to_string());
        assert!(deb.is_pending());
        deb.cancel();
        assert!(!deb.is_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_emits_immediately() {
        let (deb, mut rx) = debouncer(300);

        deb.submit("now".to_string());
        deb.flush();
        assert_eq!(rx.try_recv().unwrap(), "now");

        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_inputs_each_emit() {
        let (deb, mut rx) = debouncer(50);

        deb.submit("first".to_string());
        sleep(Duration::from_millis(60)).await;
        deb.submit("second".to_string());
        sleep(Duration::from_millis(60)).await;

        assert_eq!(rx.try_recv().unwrap(), "first");
        assert_eq!(rx.try_recv().unwrap(), "second");
    }
}
