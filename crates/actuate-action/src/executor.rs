//! Executor trait: optional per-phase hooks observing a run.

use std::sync::Arc;

use crate::completion::Completion;
use crate::error::ActionError;
use crate::execution::Execution;

/// Observer of a single run. Every hook is optional; the defaults do nothing.
///
/// Hooks may call [`Execution::done`] or [`Execution::reject`]. An error
/// returned from `init`, `will` or `perform` is folded into the run's
/// outcome; an error from `finally` is logged and ignored.
pub trait Executor: Send + Sync {
    fn init(&self, _execution: &Arc<Execution>) -> Result<(), ActionError> {
        Ok(())
    }

    fn will(&self, _execution: &Arc<Execution>) -> Result<(), ActionError> {
        Ok(())
    }

    /// The `do` hook.
    fn perform(&self, _execution: &Arc<Execution>) -> Completion {
        Completion::ready()
    }

    fn finally(&self, _execution: &Arc<Execution>) -> Completion {
        Completion::ready()
    }
}

type PhaseHook = Box<dyn Fn(&Arc<Execution>) -> Result<(), ActionError> + Send + Sync>;
type CompletionHook = Box<dyn Fn(&Arc<Execution>) -> Completion + Send + Sync>;

/// Executor assembled from closures; absent hooks are skipped.
#[derive(Default)]
pub struct Hooks {
    init: Option<PhaseHook>,
    will: Option<PhaseHook>,
    perform: Option<CompletionHook>,
    finally: Option<CompletionHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Arc<Execution>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(hook));
        self
    }

    pub fn on_will<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Arc<Execution>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.will = Some(Box::new(hook));
        self
    }

    pub fn on_perform<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Arc<Execution>) -> Completion + Send + Sync + 'static,
    {
        self.perform = Some(Box::new(hook));
        self
    }

    pub fn on_finally<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Arc<Execution>) -> Completion + Send + Sync + 'static,
    {
        self.finally = Some(Box::new(hook));
        self
    }

    /// Type-erase into the shape `execute` takes.
    pub fn into_executor(self) -> Arc<dyn Executor> {
        Arc::new(self)
    }
}

impl Executor for Hooks {
    fn init(&self, execution: &Arc<Execution>) -> Result<(), ActionError> {
        self.init.as_ref().map_or(Ok(()), |hook| hook(execution))
    }

    fn will(&self, execution: &Arc<Execution>) -> Result<(), ActionError> {
        self.will.as_ref().map_or(Ok(()), |hook| hook(execution))
    }

    fn perform(&self, execution: &Arc<Execution>) -> Completion {
        self.perform
            .as_ref()
            .map_or_else(Completion::ready, |hook| hook(execution))
    }

    fn finally(&self, execution: &Arc<Execution>) -> Completion {
        self.finally
            .as_ref()
            .map_or_else(Completion::ready, |hook| hook(execution))
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("init", &self.init.is_some())
            .field("will", &self.will.is_some())
            .field("perform", &self.perform.is_some())
            .field("finally", &self.finally.is_some())
            .finish()
    }
}
