//! Error types for the action engine.

use actuate_core::error::ActuateError;

/// Errors raised by actions, executors and the execution engine.
///
/// Errors are `Clone` because one outcome is handed to every observer of an
/// execution (its state, its promise, and any number of promise clones).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// A user-facing stop. Classified as a cancellation.
    #[error("{0}")]
    Canceled(String),
    /// An unexpected runtime fault. Always a failure, even when user facing.
    #[error("Runtime error: {message}")]
    Runtime { message: String, user_facing: bool },
    /// A generic failure.
    #[error("Action failed: {0}")]
    Failed(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Execution target is required")]
    MissingTarget,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Action not registered: {0}")]
    UnregisteredAction(String),
    #[error("Execution was dropped before it settled")]
    Abandoned,
}

impl ActionError {
    /// A user-facing cancellation error.
    pub fn canceled(message: impl Into<String>) -> Self {
        ActionError::Canceled(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        ActionError::Runtime {
            message: message.into(),
            user_facing: false,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        ActionError::InvalidOperation(message.into())
    }

    /// True for errors meant to be shown to the user as-is.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ActionError::Canceled(_)
                | ActionError::Runtime {
                    user_facing: true,
                    ..
                }
        )
    }

    pub fn is_runtime_error(&self) -> bool {
        matches!(self, ActionError::Runtime { .. })
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, ActionError::InvalidOperation(_))
    }
}

impl From<ActionError> for ActuateError {
    fn from(err: ActionError) -> Self {
        ActuateError::Execution(err.to_string())
    }
}
