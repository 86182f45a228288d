//! # Lifecycle events emitted by a task run.
//!
//! The [`EventKind`] enum classifies what happened during [`Task::run`](crate::Task::run);
//! the [`Event`] struct carries the metadata (task name, stage, reason, pending units).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskstage::{Event, EventKind, Stage};
//!
//! let ev = Event::new(EventKind::StageFailed)
//!     .with_task("import")
//!     .with_stage(Stage::Todo)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::StageFailed);
//! assert_eq!(ev.task.as_deref(), Some("import"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::stages::Stage;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of task events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A run started.
    ///
    /// Sets:
    /// - `task`: task name
    RunStarting,

    /// A stage returned an error.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `stage`: the failing stage (`Todo`, `Then` or `Finally`)
    /// - `reason`: error message
    StageFailed,

    /// The parallel stage returned while some of its units were still running.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `pending`: units still tracked at the time the stage returned
    UnitsDetached,

    /// A panic carrying a `TaskError` was caught and handed to the `on_error` observers.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `stage`: `OnError`, the stage that receives the error
    /// - `reason`: the panic error message
    PanicRecovered,

    /// A panic with any other payload is about to leave `run`.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: panic info/message
    PanicPropagated,

    /// A run returned.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: combined error message, only when the run failed
    RunFinished,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,
}

/// Task event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Stage the event refers to.
    pub stage: Option<Stage>,
    /// Human-readable reason (errors, panic details).
    pub reason: Option<Arc<str>>,
    /// Number of parallel units still running.
    pub pending: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            stage: None,
            reason: None,
            pending: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a stage.
    #[inline]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a pending-unit count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_pending(mut self, pending: usize) -> Self {
        self.pending = Some(u32::try_from(pending).unwrap_or(u32::MAX));
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
