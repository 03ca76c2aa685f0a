//! Rejection reasons and their classification into cancellation or failure.

use std::fmt;

use serde_json::Value;

use crate::error::ActionError;
use crate::state::State;

/// Anything handed to [`Execution::reject`](crate::Execution::reject).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Reason {
    /// No reason at all.
    #[default]
    Empty,
    Message(String),
    Error(ActionError),
    /// A loosely typed value, e.g. forwarded from a JSON payload.
    Value(Value),
}

impl From<&str> for Reason {
    fn from(message: &str) -> Self {
        Reason::Message(message.to_string())
    }
}

impl From<String> for Reason {
    fn from(message: String) -> Self {
        Reason::Message(message)
    }
}

impl From<ActionError> for Reason {
    fn from(err: ActionError) -> Self {
        Reason::Error(err)
    }
}

impl From<Value> for Reason {
    fn from(value: Value) -> Self {
        Reason::Value(value)
    }
}

impl<T: Into<Reason>> From<Option<T>> for Reason {
    fn from(reason: Option<T>) -> Self {
        reason.map_or(Reason::Empty, Into::into)
    }
}

/// A classified, rejected outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A deliberate stop. Only allowed while the run is still cancelable.
    Canceled(Option<ActionError>),
    Failed(ActionError),
}

impl Rejection {
    /// The final state this rejection leads to.
    pub fn state(&self) -> State {
        match self {
            Rejection::Canceled(_) => State::Canceled,
            Rejection::Failed(_) => State::Failed,
        }
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            Rejection::Canceled(err) => err.as_ref(),
            Rejection::Failed(err) => Some(err),
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Rejection::Canceled(_))
    }
}

/// User errors that are not runtime errors cancel; every other error fails.
impl From<ActionError> for Rejection {
    fn from(err: ActionError) -> Self {
        if err.is_user_error() && !err.is_runtime_error() {
            Rejection::Canceled(Some(err))
        } else {
            Rejection::Failed(err)
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Canceled(None) => write!(f, "canceled"),
            Rejection::Canceled(Some(err)) => write!(f, "canceled: {}", err),
            Rejection::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

impl std::error::Error for Rejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl Reason {
    /// Route this reason into a cancellation or a failure.
    ///
    /// Falsy reasons and plain messages cancel; user errors that are not
    /// runtime errors cancel; every other error fails. Values that are
    /// neither falsy, text nor errors are an invalid argument.
    pub fn classify(self) -> Result<Rejection, ActionError> {
        match self {
            Reason::Empty => Ok(Rejection::Canceled(None)),
            Reason::Message(message) if message.is_empty() => Ok(Rejection::Canceled(None)),
            Reason::Message(message) => Ok(Rejection::Canceled(Some(ActionError::Canceled(
                message,
            )))),
            Reason::Error(err) => Ok(err.into()),
            Reason::Value(value) if is_falsy(&value) => Ok(Rejection::Canceled(None)),
            Reason::Value(Value::String(message)) => Reason::Message(message).classify(),
            Reason::Value(other) => Err(ActionError::InvalidArgument(format!(
                "rejection reason must be a message or an error, got {}",
                other
            ))),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0 || n.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
