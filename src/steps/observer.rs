//! # Error observers.
//!
//! An [`Observer`] is notified with the error that made a task fail. It cannot fail
//! itself; whatever it does with the error (log it, flag the state) is a side effect.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::TaskError;

/// Boxed future returned by [`Observer::notify`].
pub type BoxObserverFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared handle to an observer.
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

/// Non-fallible error observer.
pub trait Observer<T>: Send + Sync + 'static {
    /// Creates the future for one notification.
    fn notify(&self, state: Arc<T>, ctx: Context, err: TaskError) -> BoxObserverFuture;
}

/// Function-backed observer implementation.
#[derive(Debug)]
pub struct ObserverFn<F> {
    f: F,
}

impl<F> ObserverFn<F> {
    /// Creates a new function-backed observer.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the observer and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<T, F, Fut> Observer<T> for ObserverFn<F>
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, Context, TaskError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn notify(&self, state: Arc<T>, ctx: Context, err: TaskError) -> BoxObserverFuture {
        Box::pin((self.f)(state, ctx, err))
    }
}
