//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [run-starting] task="import"
//! [stage-failed] task="import" stage=todo err="boom"
//! [units-detached] task="import" pending=1
//! [panic-recovered] task="import" err="bad input"
//! [run-finished] task="import" err="boom"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::RunStarting => {
                println!("[run-starting] task={task:?}");
            }
            EventKind::StageFailed => {
                println!(
                    "[stage-failed] task={task:?} stage={} err={:?}",
                    e.stage.map(|s| s.as_str()).unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::UnitsDetached => {
                println!(
                    "[units-detached] task={task:?} pending={}",
                    e.pending.unwrap_or(0)
                );
            }
            EventKind::PanicRecovered => {
                println!(
                    "[panic-recovered] task={task:?} err={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::PanicPropagated => {
                println!(
                    "[panic-propagated] task={task:?} info={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::RunFinished => match e.reason.as_deref() {
                Some(err) => println!("[run-finished] task={task:?} err={err:?}"),
                None => println!("[run-finished] task={task:?}"),
            },
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={task} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
