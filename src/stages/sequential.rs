//! Ordered, fallible step collection.

use std::sync::Arc;

use crate::context::Context;
use crate::error::TaskError;
use crate::steps::StepRef;

/// Ordered collection of steps sharing one state type.
pub struct Steps<T> {
    pub(super) fns: Vec<StepRef<T>>,
}

impl<T> Steps<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self { fns: Vec::new() }
    }

    /// Appends a step.
    pub fn add(&mut self, step: StepRef<T>) {
        self.fns.push(step);
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.fns.len()
    }

    /// Whether no step is registered.
    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    /// Runs the steps in order and returns the first error.
    ///
    /// Cancellation is polled before each step; once set, the remaining steps are
    /// skipped and `Ok(())` is returned.
    pub async fn run(&self, state: &Arc<T>, ctx: &Context) -> Result<(), TaskError>
    where
        T: 'static,
    {
        for step in &self.fns {
            if ctx.is_cancelled() {
                return Ok(());
            }
            step.call(Arc::clone(state), ctx.clone()).await?;
        }
        Ok(())
    }
}

impl<T> Default for Steps<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl: the closures are shared, `T` need not be `Clone`.
impl<T> Clone for Steps<T> {
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
    use crate::steps::StepFn;

    type Log = Mutex<Vec<&'static str>>;

    fn record(label: &'static str, result: Result<(), TaskError>) -> StepRef<Log> {
        StepFn::arc(move |s: Arc<Log>, _ctx: Context| {
            let result = result.clone();
            async move {
                s.lock().push(label);
                result
            }
        })
    }

    #[tokio::test]
    async fn test_runs_in_registration_order() {
        let mut steps = Steps::new();
        steps.add(record("a", Ok(())));
        steps.add(record("b", Ok(())));
        steps.add(record("c", Ok(())));

        let state = Arc::new(Mutex::new(Vec::new()));
        steps.run(&state, &Context::new()).await.unwrap();
        assert_eq!(*state.lock(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_error() {
        let mut steps = Steps::new();
        steps.add(record("a", Ok(())));
        steps.add(record("b", Err(TaskError::fail("b failed"))));
        steps.add(record("c", Ok(())));

        let state = Arc::new(Mutex::new(Vec::new()));
        let err = steps.run(&state, &Context::new()).await.unwrap_err();
        assert_eq!(err, TaskError::fail("b failed"));
        assert_eq!(*state.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_cancelled_context_stops_quietly() {
        let mut steps = Steps::new();
        steps.add(record("a", Err(TaskError::fail("never"))));

        let ctx = Context::new();
        ctx.cancel();
        let state = Arc::new(Mutex::new(Vec::new()));
        assert!(steps.run(&state, &ctx).await.is_ok());
        assert!(state.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_succeeds() {
        let steps: Steps<()> = Steps::default();
        assert!(steps.is_empty());
        assert!(steps.run(&Arc::new(()), &Context::new()).await.is_ok());
    }
}
