//! Hook collections owned by a task.

use crate::stages::{Observers, Steps};

/// The four stage collections of a task.
///
/// Cloning copies the lists while sharing the closures inside them.
pub(crate) struct Hooks<T> {
    pub(crate) todo: Steps<T>,
    pub(crate) then: Steps<T>,
    pub(crate) finally: Steps<T>,
    pub(crate) on_error: Observers<T>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            todo: Steps::new(),
            then: Steps::new(),
            finally: Steps::new(),
            on_error: Observers::new(),
        }
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            todo: self.todo.clone(),
            then: self.then.clone(),
            finally: self.finally.clone(),
            on_error: self.on_error.clone(),
        }
    }
}
