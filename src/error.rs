//! Error type shared by every stage of a task.
//!
//! [`TaskError`] is what steps return and what [`Task::run`](crate::Task::run) reports.
//! Two errors from different stages are merged with [`combine`]; the first one stays the
//! inspectable [`root`](TaskError::root).
//!
//! [`TaskError::Canceled`] is the distinguished value a step may return when it notices
//! cancellation. The engine does not treat it differently from any other error.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by task stages.
///
/// Cheap to clone: the same error is handed to the context payload, to every
/// `on_error` observer and back to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// A step failed.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A step stopped because it observed cancellation.
    #[error("task canceled")]
    Canceled,

    /// Two errors from different stages merged by [`combine`].
    ///
    /// Displays as `"{other}: {root}"`.
    #[error("{other}: {root}")]
    Combined {
        /// The error that happened first.
        #[source]
        root: Box<TaskError>,
        /// The error that happened later (usually in `finally`).
        other: Box<TaskError>,
    },
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use taskstage::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Combined { .. } => "task_combined",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "task canceled".to_string(),
            TaskError::Combined { root, other } => {
                format!("{} (then: {})", root.as_message(), other.as_message())
            }
        }
    }

    /// Returns the first error of a combination chain, or `self`.
    ///
    /// # Example
    /// ```
    /// use taskstage::{combine, TaskError};
    ///
    /// let err = combine(Some(TaskError::fail("boom")), Some(TaskError::fail("cleanup"))).unwrap();
    /// assert_eq!(err.root(), &TaskError::fail("boom"));
    /// assert_eq!(err.to_string(), "cleanup: boom");
    /// ```
    pub fn root(&self) -> &TaskError {
        let mut current = self;
        while let TaskError::Combined { root, .. } = current {
            current = &**root;
        }
        current
    }

    /// Indicates whether the root error is [`TaskError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self.root(), TaskError::Canceled)
    }
}

/// Merges two optional errors into one.
///
/// - either absent → the other one;
/// - both present → [`TaskError::Combined`] with `e1` as root, described by `e2`'s message.
pub fn combine(e1: Option<TaskError>, e2: Option<TaskError>) -> Option<TaskError> {
    match (e1, e2) {
        (None, e2) => e2,
        (e1, None) => e1,
        (Some(root), Some(other)) => Some(TaskError::Combined {
            root: Box::new(root),
            other: Box::new(other),
        }),
    }
}
