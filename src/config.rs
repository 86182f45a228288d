//! # Per-task configuration.
//!
//! Provides [`Config`], the settings a [`Task`](crate::Task) is built with.
//! Tasks derived with [`Task::copy_for`](crate::Task::copy_for) inherit the same config.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::borrow::Cow;

/// Settings for one task (and its copies).
///
/// ## Field semantics
/// - `name`: label attached to every event the task publishes
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `join_detached`: wait for leftover parallel units right after the `todo` stage
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Label used as `Event::task`.
    pub name: Cow<'static, str>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// Whether `run` waits for parallel units still running after the `todo` stage
    /// reported its first result.
    ///
    /// - `false` (default): the stage returns on the first error or cancellation and
    ///   leftover units keep running in the background
    /// - `true`: after the child scope is canceled, `run` waits for every unit to
    ///   finish before moving on to `then`/`on_error`
    pub join_detached: bool,
}

impl Config {
    /// Creates the default config under a different name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "task"`
    /// - `bus_capacity = 256`
    /// - `join_detached = false`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("task"),
            bus_capacity: 256,
            join_detached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_named_keeps_defaults() {
        let cfg = Config::named("import");
        assert_eq!(cfg.name, "import");
        assert_eq!(cfg.bus_capacity, 256);
        assert!(!cfg.join_detached);
    }
}
