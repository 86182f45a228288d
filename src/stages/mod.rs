//! # Stage collections.
//!
//! Ordered hook collections and the way each one is executed:
//! - [`Steps::run`] - sequential, stops quietly on cancellation, short-circuits on error;
//! - [`Steps::run_parallel`] - one spawned unit per step, first error wins;
//! - [`Observers::run`] - sequential, best-effort error notification.
//!
//! ## Rules
//! - Every collection polls cancellation (non-blocking) before invoking a hook.
//! - Registration order is execution order, except for the parallel stage.

mod observers;
mod parallel;
pub(crate) mod panic;
mod sequential;

use std::fmt;

pub use observers::Observers;
pub use sequential::Steps;

/// One of the four phases a task executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Parallel, fallible steps registered with `todo`.
    Todo,
    /// Sequential, fallible steps run after `todo` succeeded.
    Then,
    /// Sequential, fallible steps that always run last.
    Finally,
    /// Error observers.
    OnError,
}

impl Stage {
    /// Returns a short stable label for logs/events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Todo => "todo",
            Stage::Then => "then",
            Stage::Finally => "finally",
            Stage::OnError => "on_error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
