//! # Execution context passed to every hook.
//!
//! [`Context`] carries two things:
//! - a [`CancellationToken`] that steps poll to stop cooperatively;
//! - an optional [`TaskError`] describing what went wrong in an earlier stage.
//!
//! The error field is typed, so there is no lookup key to collide with. After the
//! `todo` stage the engine stores its result there; `if_else` stores the primary
//! step's error there before calling the fallback.
//!
//! ## Rules
//! - [`Context::child`] derives a token that is canceled with its parent, never the
//!   other way around.
//! - Cloning a context shares its token (canceling one clone cancels them all).

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::TaskError;

/// Cancellation signal plus the error payload of an earlier stage.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    error: Option<TaskError>,
}

impl Context {
    /// Creates a root context that is not canceled and carries no error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing token, e.g. one owned by an application shutdown path.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token, error: None }
    }

    /// Returns the underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Non-blocking poll of the cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the context is canceled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Error attached by an earlier stage, if any.
    pub fn error(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    /// Returns the context with its error payload replaced.
    #[must_use]
    pub fn with_error(mut self, error: Option<TaskError>) -> Self {
        self.error = error;
        self
    }

    /// Derives a child scope: canceled when `self` is, cancelable on its own.
    ///
    /// The error payload is inherited.
    pub fn child(&self) -> Context {
        Self {
            token: self.token.child_token(),
            error: self.error.clone(),
        }
    }
}

impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self::from_token(token)
    }
}
