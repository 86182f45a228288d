//! Ordered error-observer collection.

use std::sync::Arc;

use crate::context::Context;
use crate::error::TaskError;
use crate::steps::ObserverRef;

/// Ordered collection of error observers.
pub struct Observers<T> {
    fns: Vec<ObserverRef<T>>,
}

impl<T> Observers<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self { fns: Vec::new() }
    }

    /// Appends an observer.
    pub fn add(&mut self, observer: ObserverRef<T>) {
        self.fns.push(observer);
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.fns.len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    /// Notifies the observers in order.
    ///
    /// Stops at the first cancellation poll that sees the context canceled; the
    /// remaining observers are skipped.
    pub async fn run(&self, state: &Arc<T>, ctx: &Context, err: &TaskError)
    where
        T: 'static,
    {
        for observer in &self.fns {
            if ctx.is_cancelled() {
                break;
            }
            observer
                .notify(Arc::clone(state), ctx.clone(), err.clone())
                .await;
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            fns: self.fns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::steps::ObserverFn;

    type Log = Mutex<Vec<String>>;

    #[tokio::test]
    async fn test_notifies_every_observer_in_order() {
        let mut observers: Observers<Log> = Observers::new();
        for label in ["first", "second"] {
            observers.add(ObserverFn::arc(
                move |s: Arc<Log>, _ctx: Context, err: TaskError| async move {
                    s.lock().push(format!("{label}: {err}"));
                },
            ));
        }

        let state = Arc::new(Mutex::new(Vec::new()));
        observers
            .run(&state, &Context::new(), &TaskError::fail("boom"))
            .await;
        assert_eq!(*state.lock(), vec!["first: boom", "second: boom"]);
    }

    #[tokio::test]
    async fn test_cancellation_skips_remaining_observers() {
        let mut observers: Observers<Log> = Observers::new();
        observers.add(ObserverFn::arc(
            |s: Arc<Log>, ctx: Context, _err: TaskError| async move {
                s.lock().push("first".to_string());
                ctx.cancel();
            },
        ));
        observers.add(ObserverFn::arc(
            |s: Arc<Log>, _ctx: Context, _err: TaskError| async move {
                s.lock().push("second".to_string());
            },
        ));

        let state = Arc::new(Mutex::new(Vec::new()));
        observers
            .run(&state, &Context::new(), &TaskError::Canceled)
            .await;
        assert_eq!(*state.lock(), vec!["first"]);
    }
}
