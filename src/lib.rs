//! # taskstage
//!
//! **taskstage** groups a mutable piece of state with ordered and parallel stages of
//! fallible work, plus error and cleanup hooks, and runs them under one cancellable
//! context.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!              ┌──────────────────────────────────────────────┐
//!              │ Task<T>                                      │
//!              │  - state: Arc<T>                             │
//!              │  - hooks: todo / then / finally / on_error   │
//!              │  - bus: lifecycle events                     │
//!              └──────────────────────┬───────────────────────┘
//!                                     ▼ run(ctx)
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │ todo (parallel, child scope)                                      │
//!   │   unit #1   unit #2   unit #N   ── first error / cancel wins      │
//!   └──────────────┬───────────────────────────────┬────────────────────┘
//!             Ok   ▼                          Err  ▼
//!   ┌──────────────────────────┐       ┌──────────────────────────┐
//!   │ then (sequential)        │       │ on_error (observers)     │
//!   └──────────────┬───────────┘       └──────────────┬───────────┘
//!                  └───────────────┬──────────────────┘
//!                                  ▼
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │ finally (sequential, always) ── error combined with the result    │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Task::run(ctx)
//!   ├─► publish RunStarting
//!   ├─► todo.run_parallel(child ctx)   ─► child ctx canceled right after
//!   │       ├─ Err ─► publish StageFailed ─► on_error.run(err)
//!   │       └─ Ok  ─► then.run()
//!   ├─► finally.run()                  ─► combine(result, finally error)
//!   ├─► panic with TaskError payload   ─► publish PanicRecovered ─► on_error.run
//!   ├─► panic with other payload       ─► publish PanicPropagated ─► resume_unwind
//!   └─► publish RunFinished
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                     |
//! |-------------------|----------------------------------------------------------------|----------------------------------------|
//! | **Engine**        | Stage model, cancellation scope, panic recovery, chaining.     | [`Task`], [`Context`]                  |
//! | **Steps**         | Step and observer shapes, closure adapters, combinators.       | [`Step`], [`StepFn`], [`if_else`], [`serial`] |
//! | **Errors**        | One cloneable error type and its combinator.                   | [`TaskError`], [`combine`]             |
//! | **State**         | Optional lock wrapper for state shared by parallel steps.      | [`Guarded`]                            |
//! | **Events**        | Lifecycle events on a broadcast bus, pluggable subscribers.    | [`Event`], [`Bus`], [`Subscribe`]      |
//! | **Configuration** | Per-task name, bus capacity, detached-unit handling.           | [`Config`]                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//! - `tracing`: emits `tracing` debug/trace records from the engine.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use taskstage::{Context, Task, TaskError};
//!
//! #[derive(Default)]
//! struct Job {
//!     failed: AtomicBool,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let task = Task::<Job>::new();
//!     task.todo(|_job: Arc<Job>, _ctx: Context| async { Err(TaskError::fail("boom")) })
//!         .on_error(|job: Arc<Job>, _ctx: Context, _err: TaskError| async move {
//!             job.failed.store(true, Ordering::SeqCst);
//!         });
//!
//!     let err = task.run(&Context::new()).await.unwrap_err();
//!     assert!(err.to_string().contains("boom"));
//!     assert!(task.state().failed.load(Ordering::SeqCst));
//! }
//! ```
mod config;
mod context;
mod core;
mod error;
mod events;
mod guarded;
mod stages;
mod steps;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use context::Context;
pub use core::Task;
pub use error::{TaskError, combine};
pub use events::{Bus, Event, EventKind};
pub use guarded::Guarded;
pub use stages::{Observers, Stage, Steps};
pub use steps::{
    BoxObserverFuture, BoxStepFuture, Observer, ObserverFn, ObserverRef, Step, StepFn, StepRef,
    if_else, serial,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
