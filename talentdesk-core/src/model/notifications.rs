//! src/model/notifications.rs
//! ============================================================================
//! # `NotificationCenter`: toast queue with independent expiry timers
//!
//! Each toast lives in the queue until its timer elapses or it is dismissed.
//! Timers are Tokio tasks holding only a weak handle to the queue, so a
//! dropped center never receives late removals; dropping the center also
//! aborts every pending timer. Expiry and manual dismissal share one removal
//! path, which is where the optional `on_close` callback is taken and run,
//! after the queue lock is released.

use compact_str::CompactString;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info, instrument, trace};

use crate::{config::NotificationConfig, error::AppError};

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        };
        write!(f, "{s}")
    }
}

/// Opaque toast identifier, generated by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(CompactString);

impl NotificationId {
    fn generate() -> Self {
        Self(CompactString::new(nanoid::nanoid!(12)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs once when a toast leaves the queue by expiry or dismissal.
pub type OnClose = Box<dyn FnOnce(&NotificationId) + Send + 'static>;

/// Caller-controlled parts of a toast; everything else is defaulted.
#[derive(Default)]
pub struct NotificationOptions {
    pub title: Option<CompactString>,
    /// `None` uses the kind's default lifetime; zero disables expiry.
    pub duration: Option<Duration>,
    pub persistent: bool,
    pub on_close: Option<OnClose>,
}

impl NotificationOptions {
    #[must_use]
    pub fn title(mut self, title: impl Into<CompactString>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub const fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    #[must_use]
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&NotificationId) + Send + 'static,
    {
        self.on_close = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for NotificationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationOptions")
            .field("title", &self.title)
            .field("duration", &self.duration)
            .field("persistent", &self.persistent)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// A toast as seen by renderers.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: Option<CompactString>,
    pub message: CompactString,
    pub duration: Option<Duration>,
    pub persistent: bool,
    pub created_at: Instant,
}

impl Notification {
    /// True when a timer will remove this toast.
    #[must_use]
    pub fn expires(&self) -> bool {
        !self.persistent && self.duration.is_some_and(|d| !d.is_zero())
    }

    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if !self.expires() {
            return None;
        }
        let duration = self.duration?;
        Some(duration.saturating_sub(now.saturating_duration_since(self.created_at)))
    }

    /// `remaining / duration` in `[0, 1]` for the countdown bar. Display only.
    #[must_use]
    pub fn progress(&self, now: Instant) -> Option<f64> {
        let duration = self.duration?;
        let remaining = self.remaining(now)?;
        Some((remaining.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0))
    }
}

struct Entry {
    notification: Notification,
    on_close: Option<OnClose>,
    timer: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Queue {
    entries: Vec<Entry>,
}

impl Queue {
    fn contains(&self, id: &NotificationId) -> bool {
        self.entries.iter().any(|e| &e.notification.id == id)
    }

    fn take(&mut self, id: &NotificationId) -> Option<Entry> {
        let idx = self.entries.iter().position(|e| &e.notification.id == id)?;
        Some(self.entries.remove(idx))
    }
}

/// Remove `id` if still queued and run its close callback outside the lock.
/// `from_timer` leaves the timer handle alone since it is the caller.
fn remove_entry(queue: &Mutex<Queue>, id: &NotificationId, from_timer: bool) -> bool {
    let Some(mut entry) = queue.lock().take(id) else {
        trace!(id = %id, "Notification already removed");
        return false;
    };

    if let Some(timer) = entry.timer.take()
        && !from_timer
    {
        timer.abort();
    }

    debug!(
        marker = "NOTIFICATION_REMOVED",
        id = %id,
        kind = ?entry.notification.kind,
        expired = from_timer,
        "Notification removed"
    );

    if let Some(on_close) = entry.on_close.take() {
        on_close(id);
    }
    true
}

pub struct NotificationCenter {
    queue: Arc<Mutex<Queue>>,
    config: NotificationConfig,
    runtime: Handle,
}

impl NotificationCenter {
    /// Create a center that schedules expiry timers on the current runtime.
    pub fn new(config: NotificationConfig) -> Result<Self, AppError> {
        let runtime = Handle::try_current().map_err(|e| AppError::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(config, runtime))
    }

    #[must_use]
    pub fn with_runtime(config: NotificationConfig, runtime: Handle) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Queue::default())),
            config,
            runtime,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Queue a toast and return its id. Unset durations default to
    /// `default_duration`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(marker = "NOTIFICATION_ADDED", kind = ?kind, message_len = message.len())
    )]
    pub fn add_notification(
        &self,
        kind: NotificationKind,
        message: &str,
        options: NotificationOptions,
    ) -> NotificationId {
        let mut notification = Notification {
            id: NotificationId::generate(),
            kind,
            title: options.title,
            message: CompactString::new(message),
            duration: Some(options.duration.unwrap_or(self.config.default_duration)),
            persistent: options.persistent,
            created_at: Instant::now(),
        };

        let mut queue = self.queue.lock();
        while queue.contains(&notification.id) {
            notification.id = NotificationId::generate();
        }
        let id = notification.id.clone();

        let timer = if notification.expires() {
            notification
                .duration
                .map(|duration| self.spawn_expiry(id.clone(), notification.created_at + duration))
        } else {
            None
        };

        info!(
            id = %id,
            kind = ?kind,
            persistent = notification.persistent,
            duration_ms = notification.duration.map(|d| d.as_millis() as u64),
            "Notification queued"
        );

        queue.entries.push(Entry {
            notification,
            on_close: options.on_close,
            timer,
        });

        id
    }

    fn spawn_expiry(&self, id: NotificationId, deadline: Instant) -> JoinHandle<()> {
        let queue: Weak<Mutex<Queue>> = Arc::downgrade(&self.queue);
        self.runtime.spawn(async move {
            sleep_until(deadline).await;
            if let Some(queue) = queue.upgrade() {
                remove_entry(&queue, &id, true);
            }
        })
    }

    pub fn success(&self, message: &str, options: NotificationOptions) -> NotificationId {
        self.add_notification(NotificationKind::Success, message, options)
    }

    /// Errors stay up longer than the other kinds unless overridden.
    pub fn error(&self, message: &str, mut options: NotificationOptions) -> NotificationId {
        options.duration = options.duration.or(Some(self.config.error_duration));
        self.add_notification(NotificationKind::Error, message, options)
    }

    pub fn warning(&self, message: &str, options: NotificationOptions) -> NotificationId {
        self.add_notification(NotificationKind::Warning, message, options)
    }

    pub fn info(&self, message: &str, options: NotificationOptions) -> NotificationId {
        self.add_notification(NotificationKind::Info, message, options)
    }

    /// Dismiss one toast. Unknown or already-removed ids are a no-op.
    pub fn remove_notification(&self, id: &NotificationId) -> bool {
        remove_entry(&self.queue, id, false)
    }

    /// Drop every toast and its timer. Close callbacks are not run.
    pub fn clear_all(&self) {
        let entries = std::mem::take(&mut self.queue.lock().entries);
        for entry in &entries {
            if let Some(timer) = &entry.timer {
                timer.abort();
            }
        }
        debug!(cleared = entries.len(), "All notifications cleared");
    }

    /// Queue snapshot, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .entries
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    /// The newest `max_visible` toasts, oldest first.
    #[must_use]
    pub fn visible(&self) -> Vec<Notification> {
        let queue = self.queue.lock();
        let skip = queue.entries.len().saturating_sub(self.config.max_visible);
        queue.entries[skip..]
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    #[must_use]
    pub fn newest(&self) -> Option<NotificationId> {
        self.queue
            .lock()
            .entries
            .last()
            .map(|e| e.notification.id.clone())
    }

    #[must_use]
    pub fn contains(&self, id: &NotificationId) -> bool {
        self.queue.lock().contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().entries.is_empty()
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        for entry in &self.queue.lock().entries {
            if let Some(timer) = &entry.timer {
                timer.abort();
            }
        }
    }
}
