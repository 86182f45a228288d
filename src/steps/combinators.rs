//! # Step combinators.
//!
//! Helpers that build one step out of several, outside of any [`Task`](crate::Task).
//! Both return a plain closure of the step shape, so the result can be registered on any
//! stage or nested into another combinator.

use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::error::TaskError;
use crate::steps::step::{BoxStepFuture, StepRef};

/// Runs `primary`; if it fails, runs `fallback` and returns its result.
///
/// The primary error is attached to the fallback's context ([`Context::error`]). It is
/// swallowed unless the fallback returns it again.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use taskstage::{if_else, Context, Task, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task = Task::<()>::new();
/// task.then(if_else(
///     |_s: Arc<()>, _ctx: Context| async { Err(TaskError::fail("primary down")) },
///     |_s: Arc<()>, ctx: Context| async move {
///         assert_eq!(ctx.error(), Some(&TaskError::fail("primary down")));
///         Ok(())
///     },
/// ));
/// assert!(task.run(&Context::new()).await.is_ok());
/// # }
/// ```
pub fn if_else<T, P, PFut, F, FFut>(
    primary: P,
    fallback: F,
) -> impl Fn(Arc<T>, Context) -> BoxStepFuture + Send + Sync + 'static
where
    T: Send + Sync + 'static,
    P: Fn(Arc<T>, Context) -> PFut + Send + Sync + 'static,
    PFut: Future<Output = Result<(), TaskError>> + Send + 'static,
    F: Fn(Arc<T>, Context) -> FFut + Send + Sync + 'static,
    FFut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    let primary = Arc::new(primary);
    let fallback = Arc::new(fallback);

    move |state: Arc<T>, ctx: Context| -> BoxStepFuture {
        let primary = Arc::clone(&primary);
        let fallback = Arc::clone(&fallback);
        Box::pin(async move {
            match primary(Arc::clone(&state), ctx.clone()).await {
                Ok(()) => Ok(()),
                Err(err) => fallback(state, ctx.with_error(Some(err))).await,
            }
        })
    }
}

/// Runs `steps` one after another, stopping at the first error.
///
/// Unlike the `then`/`finally` stages this does not poll cancellation between steps.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use taskstage::{serial, Context, StepFn, StepRef, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bump: StepRef<AtomicU32> = StepFn::arc(|s: Arc<AtomicU32>, _ctx: Context| async move {
///     s.fetch_add(1, Ordering::SeqCst);
///     Ok::<_, TaskError>(())
/// });
/// let both = serial(vec![bump.clone(), bump]);
///
/// let state = Arc::new(AtomicU32::new(0));
/// both(Arc::clone(&state), Context::new()).await.unwrap();
/// assert_eq!(state.load(Ordering::SeqCst), 2);
/// # }
/// ```
pub fn serial<T>(
    steps: Vec<StepRef<T>>,
) -> impl Fn(Arc<T>, Context) -> BoxStepFuture + Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    let steps: Arc<[StepRef<T>]> = steps.into();

    move |state: Arc<T>, ctx: Context| -> BoxStepFuture {
        let steps = Arc::clone(&steps);
        Box::pin(async move {
            for step in steps.iter() {
                step.call(Arc::clone(&state), ctx.clone()).await?;
            }
            Ok(())
        })
    }
}
