//! # Parallel execution of a step collection.
//!
//! [`Steps::run_parallel`] spawns one unit per step and reports the first error.
//!
//! ## Flow
//! ```text
//! run_parallel(state, ctx)
//!   ├─► spawn unit #1 ─► poll ctx ─► step.call() ─► try_send(outcome)
//!   ├─► spawn unit #2 ─► poll ctx ─► (canceled)  ─► try_send(Ok)
//!   └─► collector loop (N results max):
//!         select! {
//!           ctx.cancelled()  ─► return Ok(())
//!           recv(outcome)    ─► Err(e) ─► return Err(e)
//!                               Panicked ─► resume_unwind on the caller
//!                               Ok ─► continue
//!         }
//! ```
//!
//! ## Rules
//! - The channel holds N outcomes, so a unit never blocks on reporting.
//! - The collector does **not** wait for stragglers: once it returns, leftover units keep
//!   running against the same state until they finish or see cancellation.
//! - With several failures, the reported error depends on completion order.
//! - Cancellation racing a result is not resolved deterministically (unbiased `select!`).

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;

#[cfg(feature = "tracing")]
use tracing::trace;

use super::sequential::Steps;
use crate::context::Context;
use crate::error::TaskError;

/// What a unit reports back to the collector.
enum Outcome {
    Done(Result<(), TaskError>),
    Panicked(Box<dyn Any + Send>),
}

impl<T: Send + Sync + 'static> Steps<T> {
    /// Runs every step concurrently and returns the first error observed.
    ///
    /// Units are spawned on `tracker`, which lets the owner count or join the units still
    /// running after this call returned. Must be called within a tokio runtime.
    ///
    /// A panic inside a step is caught in its unit and re-raised here, on the caller.
    pub async fn run_parallel(
        &self,
        state: &Arc<T>,
        ctx: &Context,
        tracker: &TaskTracker,
    ) -> Result<(), TaskError> {
        let total = self.fns.len();
        if total == 0 {
            return Ok(());
        }

        let (tx, mut rx) = mpsc::channel::<Outcome>(total);
        for step in &self.fns {
            let step = Arc::clone(step);
            let state = Arc::clone(state);
            let ctx = ctx.clone();
            let tx = tx.clone();

            tracker.spawn(async move {
                let outcome = if ctx.is_cancelled() {
                    Outcome::Done(Ok(()))
                } else {
                    let fut = async move { step.call(state, ctx).await };
                    match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(res) => Outcome::Done(res),
                        Err(payload) => Outcome::Panicked(payload),
                    }
                };
                // The collector may already be gone.
                let _ = tx.try_send(outcome);
            });
        }
        drop(tx);

        for _ in 0..total {
            tokio::select! {
                _ = ctx.cancelled() => {
                    #[cfg(feature = "tracing")]
                    trace!("parallel stage canceled while collecting");
                    return Ok(());
                }
                received = rx.recv() => match received {
                    Some(Outcome::Done(Ok(()))) => {}
                    Some(Outcome::Done(Err(err))) => {
                        #[cfg(feature = "tracing")]
                        trace!(error = %err, "parallel stage failed");
                        return Err(err);
                    }
                    Some(Outcome::Panicked(payload)) => std::panic::resume_unwind(payload),
                    // Every sender dropped: the runtime shut the units down.
                    None => break,
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::steps::{StepFn, StepRef};

    fn bump(delay: Duration) -> StepRef<AtomicU32> {
        StepFn::arc(move |s: Arc<AtomicU32>, _ctx: Context| async move {
            tokio::time::sleep(delay).await;
            s.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TaskError>(())
        })
    }

    fn explode() -> Result<(), TaskError> {
        std::panic::panic_any(TaskError::fail("unit panic"))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_all_units_complete_on_success() {
        let mut steps: Steps<AtomicU32> = Steps::new();
        steps.add(bump(Duration::from_millis(10)));
        steps.add(bump(Duration::from_millis(10)));

        let state = Arc::new(AtomicU32::new(0));
        let tracker = TaskTracker::new();
        steps
            .run_parallel(&state, &Context::new(), &tracker)
            .await
            .unwrap();
        assert_eq!(state.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_first_error_returns_without_waiting() {
        let mut steps: Steps<AtomicU32> = Steps::new();
        steps.add(StepFn::arc(|_s: Arc<AtomicU32>, _ctx: Context| async {
            Err::<(), _>(TaskError::fail("boom"))
        }));
        steps.add(bump(Duration::from_millis(200)));

        let state = Arc::new(AtomicU32::new(0));
        let tracker = TaskTracker::new();
        let err = steps
            .run_parallel(&state, &Context::new(), &tracker)
            .await
            .unwrap_err();

        assert_eq!(err, TaskError::fail("boom"));
        // The slow unit is still running in the background.
        assert_eq!(state.load(Ordering::SeqCst), 0);

        tracker.close();
        tracker.wait().await;
        assert_eq!(state.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_every_step() {
        let mut steps: Steps<AtomicU32> = Steps::new();
        steps.add(bump(Duration::ZERO));
        steps.add(StepFn::arc(|_s: Arc<AtomicU32>, _ctx: Context| async {
            Err::<(), _>(TaskError::fail("never"))
        }));

        let ctx = Context::new();
        ctx.cancel();
        let state = Arc::new(AtomicU32::new(0));
        let tracker = TaskTracker::new();
        assert!(steps.run_parallel(&state, &ctx, &tracker).await.is_ok());

        tracker.close();
        tracker.wait().await;
        assert_eq!(state.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_during_collection_returns_ok() {
        let mut steps: Steps<AtomicU32> = Steps::new();
        steps.add(StepFn::arc(|_s: Arc<AtomicU32>, ctx: Context| async move {
            ctx.cancel();
            Ok::<_, TaskError>(())
        }));
        steps.add(StepFn::arc(|_s: Arc<AtomicU32>, ctx: Context| async move {
            ctx.cancelled().await;
            Err::<(), _>(TaskError::Canceled)
        }));

        let state = Arc::new(AtomicU32::new(0));
        let tracker = TaskTracker::new();
        let res = steps.run_parallel(&state, &Context::new(), &tracker).await;
        // Either the cancellation or the canceled unit's error can win the race.
        assert!(matches!(res, Ok(()) | Err(TaskError::Canceled)));
    }

    #[tokio::test]
    async fn test_unit_panic_is_raised_on_collector() {
        let mut steps: Steps<AtomicU32> = Steps::new();
        steps.add(StepFn::arc(|_s: Arc<AtomicU32>, _ctx: Context| async { explode() }));

        let state = Arc::new(AtomicU32::new(0));
        let tracker = TaskTracker::new();
        let caught = AssertUnwindSafe(steps.run_parallel(&state, &Context::new(), &tracker))
            .catch_unwind()
            .await;

        let payload = caught.unwrap_err();
        assert_eq!(
            payload.downcast_ref::<TaskError>(),
            Some(&TaskError::fail("unit panic"))
        );
    }
}
