//! Asynchronous action that waits before completing.

use std::sync::Arc;
use std::time::Duration;

use actuate_core::config::EngineConfig;
use serde_json::Value;
use tokio::time::Instant;

use crate::action::ActionKind;
use crate::completion::Completion;
use crate::error::ActionError;
use crate::execution::Execution;

/// Sleeps for `millis` on the tokio timer, then completes with the elapsed
/// milliseconds.
#[derive(Debug, Clone)]
pub struct DelayAction {
    millis: Option<u64>,
    max_millis: u64,
}

impl DelayAction {
    pub fn new(millis: u64, max_millis: u64) -> Self {
        Self {
            millis: Some(millis),
            max_millis,
        }
    }

    /// Build from `{"millis": n}`, capped by `max_delay_ms`.
    pub fn from_params(params: &Value, config: &EngineConfig) -> Self {
        Self {
            millis: params.get("millis").and_then(|v| v.as_u64()),
            max_millis: config.max_delay_ms,
        }
    }
}

impl ActionKind for DelayAction {
    fn default_label(&self) -> &str {
        "Delay"
    }

    fn default_description(&self) -> &str {
        "Waits, then completes with the elapsed milliseconds"
    }

    fn is_sync(&self) -> bool {
        false
    }

    fn validate(&self) -> Vec<ActionError> {
        match self.millis {
            None => vec![ActionError::Validation(
                "Delay needs a non-negative integer `millis`".to_string(),
            )],
            Some(millis) if millis > self.max_millis => vec![ActionError::Validation(format!(
                "Delay of {}ms exceeds the {}ms limit",
                millis, self.max_millis
            ))],
            Some(_) => Vec::new(),
        }
    }

    fn perform(&self, execution: &Arc<Execution>) -> Completion {
        let Some(millis) = self.millis else {
            return Completion::fail(ActionError::failed("delay has no duration"));
        };
        let execution = Arc::clone(execution);
        Completion::pending(async move {
            let started = Instant::now();
            tokio::time::sleep(Duration::from_millis(millis)).await;
            let elapsed = started.elapsed().as_millis() as u64;
            tracing::debug!(millis, elapsed, "Delay elapsed");
            execution.done(Some(Value::from(elapsed)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::execution::target;
    use serde_json::json;

    #[test]
    fn test_delay_from_params_uses_config_cap() {
        let config = EngineConfig {
            max_delay_ms: 100,
            ..EngineConfig::default()
        };
        assert!(DelayAction::from_params(&json!({"millis": 100}), &config)
            .validate()
            .is_empty());

        let errors = DelayAction::from_params(&json!({"millis": 101}), &config).validate();
        assert_eq!(
            errors,
            vec![ActionError::Validation(
                "Delay of 101ms exceeds the 100ms limit".to_string()
            )]
        );
    }

    #[test]
    fn test_delay_requires_integer_millis() {
        let config = EngineConfig::default();
        for params in [json!({}), json!({"millis": -5}), json!({"millis": "soon"})] {
            assert_eq!(
                DelayAction::from_params(&params, &config).validate().len(),
                1,
                "{} should be invalid",
                params
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_completes_with_elapsed_millis() {
        let promise = Action::new(DelayAction::new(250, 1_000))
            .execute_async(Some(target(())), None)
            .unwrap();
        let elapsed = promise.await.unwrap().unwrap().as_u64().unwrap();
        assert!(elapsed >= 250, "elapsed {}ms", elapsed);
    }
}
