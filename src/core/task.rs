//! # Task: one state value, four stages of hooks.
//!
//! A [`Task`] groups a state value with the hooks that work on it and runs them under a
//! single cancellable [`Context`].
//!
//! ## Run protocol
//! ```text
//! run(ctx)
//!   ├─► snapshot hooks
//!   ├─► panic guard {
//!   │     ├─► child scope ─► todo.run_parallel() ─► cancel child scope (always)
//!   │     ├─► ctx.with_error(todo result)   ─► kept even if a later hook panics
//!   │     ├─ Err ──► on_error.run(err) ──► result = Err
//!   │     └─ Ok  ──► then.run()        ──► result = then result
//!   │   }
//!   ├─► finally.run()  (always, own panic guard)
//!   ├─► result = combine(result, finally result)
//!   └─► panic caught?
//!         ├─ TaskError payload ─► on_error.run(payload), return result
//!         └─ other payload     ─► resume_unwind
//! ```
//!
//! ## Rules
//! - `then` runs only when `todo` succeeded; `on_error` runs only on a `todo` error or a
//!   `TaskError` panic; `finally` runs exactly once per `run`.
//! - A `finally` error never replaces an earlier error: the earlier one stays the root.
//! - The parallel stage returns on the first error without waiting for its other units.
//!   Those keep running against the state until they finish or notice the canceled child
//!   scope (see [`Task::detached`], [`Task::join_detached`]).
//! - The state is shared by all parallel steps without any locking; coordinating access
//!   is the caller's job (see [`Guarded`](crate::Guarded)).

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::config::Config;
use crate::context::Context;
use crate::core::hooks::Hooks;
use crate::error::{TaskError, combine};
use crate::events::{Bus, Event, EventKind};
use crate::stages::Stage;
use crate::stages::panic::panic_message;
use crate::steps::{ObserverFn, ObserverRef, StepFn, StepRef};

/// Handle to a task: a state value plus its `todo`, `then`, `finally` and `on_error` hooks.
///
/// Cloning the handle is cheap and yields the same task (same state, same hooks).
/// Use [`Task::copy_for`] to reuse the hooks for another state.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use taskstage::{Context, Task, TaskError};
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = Task::<AtomicU32>::new();
/// task.todo(|s: Arc<AtomicU32>, _ctx: Context| async move {
///     s.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// })
/// .todo(|s: Arc<AtomicU32>, _ctx: Context| async move {
///     s.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// })
/// .then(|s: Arc<AtomicU32>, _ctx: Context| async move {
///     if s.load(Ordering::SeqCst) == 2 {
///         Ok(())
///     } else {
///         Err(TaskError::fail("todo steps did not both run"))
///     }
/// });
///
/// task.run(&Context::new()).await.unwrap();
/// assert_eq!(task.state().load(Ordering::SeqCst), 2);
/// # }
/// ```
pub struct Task<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    state: Arc<T>,
    hooks: RwLock<Hooks<T>>,
    config: Config,
    name: Arc<str>,
    bus: Bus,
    /// Parallel units spawned by any run of this task.
    detached: TaskTracker,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + Send + Sync + 'static> Task<T> {
    /// Creates a task owning `T::default()`.
    pub fn new() -> Self {
        Self::new_with(T::default())
    }
}

impl<T: Default + Send + Sync + 'static> Default for Task<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> Task<T> {
    /// Creates a task owning `state`.
    pub fn new_with(state: T) -> Self {
        Self::with_config(state, Config::default())
    }

    /// Creates a task owning `state` with explicit settings.
    pub fn with_config(state: T, config: Config) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        Self::build(Arc::new(state), Hooks::default(), config, bus)
    }

    /// Creates a task over a state handle the caller keeps a clone of.
    pub fn from_shared(state: Arc<T>) -> Self {
        let config = Config::default();
        let bus = Bus::new(config.bus_capacity_clamped());
        Self::build(state, Hooks::default(), config, bus)
    }

    fn build(state: Arc<T>, hooks: Hooks<T>, config: Config, bus: Bus) -> Self {
        let name: Arc<str> = Arc::from(config.name.as_ref());
        Self {
            inner: Arc::new(Inner {
                state,
                hooks: RwLock::new(hooks),
                config,
                name,
                bus,
                detached: TaskTracker::new(),
            }),
        }
    }

    /// Returns the state (no copy).
    pub fn state(&self) -> &T {
        &self.inner.state
    }

    /// Returns a new handle to the state.
    pub fn shared_state(&self) -> Arc<T> {
        Arc::clone(&self.inner.state)
    }

    /// Returns the settings this task was built with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the bus this task publishes its events to.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Creates a receiver for the events of subsequent runs.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Adds a step to the parallel `todo` stage.
    pub fn todo<F, Fut>(&self, f: F) -> &Self
    where
        F: Fn(Arc<T>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.todo_step(StepFn::arc(f))
    }

    /// Adds a shared step to the parallel `todo` stage.
    pub fn todo_step(&self, step: StepRef<T>) -> &Self {
        self.inner.hooks.write().todo.add(step);
        self
    }

    /// Adds a step run after every `todo` step succeeded.
    pub fn then<F, Fut>(&self, f: F) -> &Self
    where
        F: Fn(Arc<T>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.then_step(StepFn::arc(f))
    }

    /// Adds a shared step to the `then` stage.
    pub fn then_step(&self, step: StepRef<T>) -> &Self {
        self.inner.hooks.write().then.add(step);
        self
    }

    /// Adds a step run at the end of every run, whatever happened before.
    pub fn finally<F, Fut>(&self, f: F) -> &Self
    where
        F: Fn(Arc<T>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.finally_step(StepFn::arc(f))
    }

    /// Adds a shared step to the `finally` stage.
    pub fn finally_step(&self, step: StepRef<T>) -> &Self {
        self.inner.hooks.write().finally.add(step);
        self
    }

    /// Adds an observer notified when `todo` fails or a step panics with a [`TaskError`].
    pub fn on_error<F, Fut>(&self, f: F) -> &Self
    where
        F: Fn(Arc<T>, Context, TaskError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error_observer(ObserverFn::arc(f))
    }

    /// Adds a shared observer to the `on_error` stage.
    pub fn on_error_observer(&self, observer: ObserverRef<T>) -> &Self {
        self.inner.hooks.write().on_error.add(observer);
        self
    }

    /// Returns a task over `state` that runs the same hooks.
    ///
    /// The hook closures are shared; the lists are copied, so hooks registered on either
    /// task afterwards stay on that task. The copy keeps the config and publishes to the
    /// same bus.
    pub fn copy_for(&self, state: T) -> Task<T> {
        let hooks = self.inner.hooks.read().clone();
        Self::build(
            Arc::new(state),
            hooks,
            self.inner.config.clone(),
            self.inner.bus.clone(),
        )
    }

    /// Runs `next` at the end of this task's `finally` stage and returns `next`.
    ///
    /// `next` receives the context of this task's `finally` stage, and its error (if any)
    /// counts as a `finally` error of this task. Chaining a task to one of its own
    /// predecessors makes `run` recurse forever.
    pub fn chain(&self, next: Task<T>) -> Task<T> {
        let successor = next.clone();
        self.finally(move |_state: Arc<T>, ctx: Context| {
            let next = successor.clone();
            async move { next.run(&ctx).await }
        });
        next
    }

    /// Number of parallel units still running, including ones left behind by a finished
    /// `todo` stage.
    pub fn detached(&self) -> usize {
        self.inner.detached.len()
    }

    /// Waits until every parallel unit spawned so far has finished.
    pub async fn join_detached(&self) {
        let tracker = &self.inner.detached;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }

    /// Runs the stages and returns the combined error, if any.
    ///
    /// ### Errors
    /// - the first `todo` error (by completion order), or the first `then` error;
    /// - a `finally` error, combined with the former when both exist.
    ///
    /// ### Panics
    /// A panic whose payload is not a [`TaskError`] is re-raised once `finally` has run.
    pub async fn run(&self, ctx: &Context) -> Result<(), TaskError> {
        let hooks = self.inner.hooks.read().clone();
        let state = &self.inner.state;

        self.publish(Event::new(EventKind::RunStarting));
        #[cfg(feature = "tracing")]
        debug!(task = %self.inner.name, todo = hooks.todo.len(), "run starting");

        // Filled by the stages as they settle, so it survives a panic in a later stage.
        let mut settled = None;
        let body = AssertUnwindSafe(self.run_stages(&hooks, ctx, &mut settled))
            .catch_unwind()
            .await;
        let mut panic = body.err();
        let (result, stage_ctx) = settled.unwrap_or_else(|| (Ok(()), ctx.clone()));

        let finally = AssertUnwindSafe(hooks.finally.run(state, &stage_ctx))
            .catch_unwind()
            .await;
        let finally_err = match finally {
            Ok(res) => res.err(),
            Err(payload) => {
                if panic.is_none() {
                    panic = Some(payload);
                }
                None
            }
        };
        if let Some(err) = &finally_err {
            self.publish_failed(Stage::Finally, err);
        }
        let err = combine(result.err(), finally_err);

        if let Some(payload) = panic {
            match payload.downcast::<TaskError>() {
                Ok(recovered) => {
                    self.publish(
                        Event::new(EventKind::PanicRecovered)
                            .with_stage(Stage::OnError)
                            .with_reason(recovered.to_string()),
                    );
                    hooks.on_error.run(state, &stage_ctx, &recovered).await;
                }
                Err(payload) => {
                    self.publish(
                        Event::new(EventKind::PanicPropagated)
                            .with_reason(panic_message(payload.as_ref())),
                    );
                    std::panic::resume_unwind(payload);
                }
            }
        }

        let mut finished = Event::new(EventKind::RunFinished);
        if let Some(err) = &err {
            finished = finished.with_reason(err.to_string());
        }
        self.publish(finished);
        #[cfg(feature = "tracing")]
        debug!(task = %self.inner.name, failed = err.is_some(), "run finished");

        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// `todo`, then either `on_error` or `then`.
    ///
    /// `settled` receives the stage result and the context the later stages see. It is
    /// set right after `todo`, before any hook that may panic, and updated by `then`.
    async fn run_stages(
        &self,
        hooks: &Hooks<T>,
        ctx: &Context,
        settled: &mut Option<(Result<(), TaskError>, Context)>,
    ) {
        let state = &self.inner.state;

        let scope = ctx.child();
        // Cancels the scope on every exit path, unwinding included.
        let release = scope.token().clone().drop_guard();
        let todo = hooks
            .todo
            .run_parallel(state, &scope, &self.inner.detached)
            .await;
        drop(release);
        self.settle_detached().await;

        let ctx = ctx.clone().with_error(todo.as_ref().err().cloned());
        *settled = Some((todo.clone(), ctx.clone()));
        if let Err(err) = todo {
            self.publish_failed(Stage::Todo, &err);
            hooks.on_error.run(state, &ctx, &err).await;
            return;
        }

        let then = hooks.then.run(state, &ctx).await;
        if let Err(err) = &then {
            self.publish_failed(Stage::Then, err);
        }
        *settled = Some((then, ctx));
    }

    /// Joins leftover units when configured to, reports them otherwise.
    async fn settle_detached(&self) {
        if self.inner.config.join_detached {
            self.join_detached().await;
            return;
        }
        let pending = self.detached();
        if pending > 0 {
            #[cfg(feature = "tracing")]
            debug!(task = %self.inner.name, pending, "parallel units left running");
            self.publish(Event::new(EventKind::UnitsDetached).with_pending(pending));
        }
    }

    fn publish_failed(&self, stage: Stage, err: &TaskError) {
        self.publish(
            Event::new(EventKind::StageFailed)
                .with_stage(stage)
                .with_reason(err.to_string()),
        );
    }

    fn publish(&self, ev: Event) {
        self.inner.bus.publish(ev.with_task(Arc::clone(&self.inner.name)));
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks = self.inner.hooks.read();
        f.debug_struct("Task")
            .field("name", &self.inner.name)
            .field("todo", &hooks.todo.len())
            .field("then", &hooks.then.len())
            .field("finally", &hooks.finally.len())
            .field("on_error", &hooks.on_error.len())
            .finish()
    }
}
