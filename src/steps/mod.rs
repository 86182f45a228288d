//! # Step shapes and combinators.
//!
//! This module provides the function shapes every stage runs:
//! - [`Step`] - fallible unit of work `(state, ctx) -> Result<(), TaskError>`
//! - [`StepFn`] - closure-backed step, shared as [`StepRef`]
//! - [`Observer`] - error observer `(state, ctx, err) -> ()`
//! - [`ObserverFn`] - closure-backed observer, shared as [`ObserverRef`]
//! - [`if_else`], [`serial`] - combinators producing plain steps

mod combinators;
mod observer;
mod step;

pub use combinators::{if_else, serial};
pub use observer::{BoxObserverFuture, Observer, ObserverFn, ObserverRef};
pub use step::{BoxStepFuture, Step, StepFn, StepRef};
