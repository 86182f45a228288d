//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] listener that
//! feeds it from a task's bus, and the optional built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Task::run ── publish(Event) ──► Bus ──► SubscriberSet listener
//!                                              │
//!                                    ┌─────────┼─────────┐
//!                                    ▼         ▼         ▼
//!                                LogWriter  Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
