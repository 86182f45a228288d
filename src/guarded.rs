//! # Lock-protected state.
//!
//! The engine shares one state value across every parallel step without any locking.
//! [`Guarded`] is an optional wrapper for state (or a part of it) that several steps
//! mutate at once.
//!
//! The guard returned by [`Guarded::lock`] is not `Send`, so it cannot be held across an
//! `.await` inside a spawned step; keep critical sections synchronous.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskstage::{Context, Guarded, Task, TaskError};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let task = Task::new_with(Guarded::new(Vec::<u32>::new()));
//! for n in 0..3 {
//!     task.todo(move |s: Arc<Guarded<Vec<u32>>>, _ctx: Context| async move {
//!         s.update(|v| v.push(n));
//!         Ok::<_, TaskError>(())
//!     });
//! }
//! task.run(&Context::new()).await.unwrap();
//! assert_eq!(task.state().lock().len(), 3);
//! # }
//! ```

use parking_lot::{Mutex, MutexGuard};

/// A value behind a mutex.
#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    /// Wraps `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Locks the value until the guard is dropped.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access and returns its result.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Consumes the wrapper and returns the value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Clone> Guarded<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }
}

impl<T> From<T> for Guarded<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
