//! Maybe-awaitable hook results.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::ActionError;

/// What a `perform` or `finally` hook hands back to the engine: either an
/// outcome that is already known, or a future the engine awaits before
/// moving on.
pub enum Completion {
    Ready(Result<(), ActionError>),
    Pending(BoxFuture<'static, Result<(), ActionError>>),
}

impl Completion {
    /// A hook that finished without error.
    pub fn ready() -> Self {
        Completion::Ready(Ok(()))
    }

    pub fn fail(err: ActionError) -> Self {
        Completion::Ready(Err(err))
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Completion::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }
}

impl Default for Completion {
    fn default() -> Self {
        Completion::ready()
    }
}

impl From<Result<(), ActionError>> for Completion {
    fn from(result: Result<(), ActionError>) -> Self {
        Completion::Ready(result)
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Completion::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
