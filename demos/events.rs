//! # Example: events
//!
//! Observing task runs through the event bus.
//!
//! Shows how to:
//! - Attach the built-in [`LogWriter`] and a custom subscriber to a task's bus.
//! - See `StageFailed`, `UnitsDetached` and `PanicRecovered` events.
//!
//! ## Flow
//! ```text
//! Task::run() ──► Bus ──► SubscriberSet listener
//!                              ├─► LogWriter.on_event()   (stdout)
//!                              └─► Failures.on_event()    (counter)
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! cargo run --example events --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use taskstage::{
    Config, Context, Event, EventKind, LogWriter, Subscribe, SubscriberSet, Task, TaskError,
};

/// Counts failed stages.
#[derive(Clone, Default)]
struct Failures(Arc<AtomicU32>);

#[async_trait]
impl Subscribe for Failures {
    async fn on_event(&self, ev: &Event) {
        if matches!(ev.kind, EventKind::StageFailed) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn name(&self) -> &'static str {
        "failures"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let task = Task::with_config((), Config::named("import"));
    let failures = Failures::default();
    let subs: Vec<Arc<dyn Subscribe>> =
        vec![Arc::new(LogWriter::new()), Arc::new(failures.clone())];
    let set = SubscriberSet::spawn(task.bus(), subs);

    // A fast failure leaves the slow unit running.
    task.todo(|_s: Arc<()>, _ctx: Context| async { Err(TaskError::fail("bad row 17")) })
        .todo(|_s: Arc<()>, ctx: Context| async move {
            tokio::select! {
                _ = ctx.cancelled() => Err(TaskError::Canceled),
                _ = tokio::time::sleep(Duration::from_secs(5)) => Ok(()),
            }
        })
        .finally(|_s: Arc<()>, ctx: Context| async move {
            if ctx.error().is_some_and(|e| !e.is_canceled()) {
                std::panic::panic_any(TaskError::fail("cleanup gave up"));
            }
            Ok(())
        });

    let res = task.run(&Context::new()).await;
    println!("[main] run returned {res:?}");

    task.join_detached().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    set.shutdown().await;

    println!("[main] failed stages: {}", failures.0.load(Ordering::Relaxed));
    Ok(())
}
