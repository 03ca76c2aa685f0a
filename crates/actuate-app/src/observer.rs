//! Executor that reports each phase of a CLI run.

use std::sync::Arc;

use actuate_action::{ActionError, Completion, Execution, Executor};

/// Logs every phase it observes; never changes the outcome.
pub struct LoggingExecutor;

impl Executor for LoggingExecutor {
    fn init(&self, execution: &Arc<Execution>) -> Result<(), ActionError> {
        tracing::info!(execution_id = %execution.id(), label = %execution.label(), "init");
        Ok(())
    }

    fn will(&self, execution: &Arc<Execution>) -> Result<(), ActionError> {
        tracing::info!(execution_id = %execution.id(), "will");
        Ok(())
    }

    fn perform(&self, execution: &Arc<Execution>) -> Completion {
        tracing::info!(execution_id = %execution.id(), sync = execution.is_sync(), "do");
        Completion::ready()
    }

    fn finally(&self, execution: &Arc<Execution>) -> Completion {
        tracing::info!(
            execution_id = %execution.id(),
            state = %execution.state(),
            "finally"
        );
        Completion::ready()
    }
}
