//! # Step abstraction and function-backed implementation.
//!
//! A [`Step`] receives the task state and a [`Context`] and returns a boxed future.
//! [`StepFn`] wraps a closure `F: Fn(Arc<T>, Context) -> Fut`, producing a fresh future
//! per call; the closure itself is shared between every run and every copy of a task.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use taskstage::{Context, StepFn, StepRef, TaskError};
//!
//! let step: StepRef<AtomicU32> = StepFn::arc(|state: Arc<AtomicU32>, ctx: Context| async move {
//!     if ctx.is_cancelled() {
//!         return Ok(());
//!     }
//!     state.fetch_add(1, Ordering::SeqCst);
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = step;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::TaskError;

/// Boxed future returned by [`Step::call`].
pub type BoxStepFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a step.
pub type StepRef<T> = Arc<dyn Step<T>>;

/// # Fallible unit of work over shared state.
///
/// Implementors should check `ctx.is_cancelled()` and return early once it is set.
pub trait Step<T>: Send + Sync + 'static {
    /// Creates the future for one invocation.
    fn call(&self, state: Arc<T>, ctx: Context) -> BoxStepFuture;
}

/// Function-backed step implementation.
#[derive(Debug)]
pub struct StepFn<F> {
    f: F,
}

impl<F> StepFn<F> {
    /// Creates a new function-backed step.
    ///
    /// Prefer [`StepFn::arc`] when you immediately need a [`StepRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the step and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<T, F, Fut> Step<T> for StepFn<F>
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, Context) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn call(&self, state: Arc<T>, ctx: Context) -> BoxStepFuture {
        Box::pin((self.f)(state, ctx))
    }
}
