//! Action that completes with a message.

use std::sync::Arc;

use serde_json::Value;

use crate::action::ActionKind;
use crate::completion::Completion;
use crate::error::ActionError;
use crate::execution::Execution;

/// Synchronous action whose result is its `message` parameter.
#[derive(Debug, Clone)]
pub struct EchoAction {
    message: String,
}

impl EchoAction {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build from `{"message": "..."}`. A missing message is caught by
    /// validation, not here.
    pub fn from_params(params: &Value) -> Self {
        let message = params
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        Self::new(message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ActionKind for EchoAction {
    fn default_label(&self) -> &str {
        "Echo"
    }

    fn default_description(&self) -> &str {
        "Completes with the configured message"
    }

    fn validate(&self) -> Vec<ActionError> {
        if self.message.trim().is_empty() {
            vec![ActionError::Validation(
                "Echo message must not be empty".to_string(),
            )]
        } else {
            Vec::new()
        }
    }

    fn perform(&self, execution: &Arc<Execution>) -> Completion {
        tracing::debug!(message = %self.message, "Echoing");
        execution
            .done(Some(Value::String(self.message.clone())))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::execution::target;
    use serde_json::json;

    #[test]
    fn test_echo_completes_with_message() {
        let execution = Action::new(EchoAction::new("hello"))
            .execute(Some(target(())), None)
            .unwrap();
        assert!(execution.is_done());
        assert_eq!(execution.result(), Some(json!("hello")));
    }

    #[test]
    fn test_echo_from_params() {
        let echo = EchoAction::from_params(&json!({"message": "call Bob"}));
        assert_eq!(echo.message(), "call Bob");
        assert!(echo.validate().is_empty());
    }

    #[test]
    fn test_echo_missing_message_is_invalid() {
        let echo = EchoAction::from_params(&json!({}));
        let errors = echo.validate();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ActionError::Validation(_)));
    }

    #[test]
    fn test_echo_blank_message_refused_before_running() {
        let err = Action::new(EchoAction::new("   "))
            .execute(Some(target(())), None)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::Validation("Echo message must not be empty".to_string())
        );
    }
}
