//! Task engine.
//!
//! The only public API from this module is [`Task`], which owns a state value and its
//! hooks and implements the run protocol.
//!
//! Internal modules:
//! - [`task`]: the `Task` handle, builders, `run`, `copy_for`, `chain`;
//! - [`hooks`]: the four stage collections a task carries.

mod hooks;
mod task;

pub use task::Task;
