//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers into a
//! task's [`Bus`](crate::Bus) through a [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Rules
//! - Events are delivered sequentially (FIFO), one subscriber after another.
//! - Panics are caught; the listener publishes `EventKind::SubscriberPanicked`.
//! - A slow subscriber delays the others; lagging behind the bus capacity skips events.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskstage::{Event, EventKind, Subscribe};
//!
//! struct Failures;
//!
//! #[async_trait]
//! impl Subscribe for Failures {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::StageFailed) {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for task observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the listener task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
