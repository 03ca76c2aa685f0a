//! Actions: cloneable, validatable descriptions of an operation.

use std::fmt;
use std::sync::Arc;

use crate::completion::Completion;
use crate::error::ActionError;
use crate::execution::{Execution, Target};
use crate::executor::Executor;
use crate::promise::Promise;
use crate::state::State;

/// The domain half of an action: its kind-level defaults, validation and
/// default behavior. Implementations are immutable once built, so one kind
/// can back any number of actions and running clones.
pub trait ActionKind: Send + Sync + 'static {
    /// Label used when the action has no non-empty override.
    fn default_label(&self) -> &str;

    fn default_description(&self) -> &str {
        ""
    }

    /// Whether runs of this kind complete within the `execute` call.
    fn is_sync(&self) -> bool {
        true
    }

    /// Validation errors, in order. Empty means the action is valid.
    fn validate(&self) -> Vec<ActionError> {
        Vec::new()
    }

    /// Default behavior, run during the `do` phase when nothing settled the
    /// execution before it.
    fn perform(&self, _execution: &Arc<Execution>) -> Completion {
        Completion::ready()
    }
}

/// A labelled action ready to be executed.
///
/// Label and description can be changed only while the action is editable.
/// A detached action is always a candidate and therefore editable; the copy
/// owned by a running execution locks once the run leaves `init`.
pub struct Action {
    kind: Arc<dyn ActionKind>,
    label: Option<String>,
    description: Option<String>,
    state: State,
}

impl Action {
    pub fn new(kind: impl ActionKind) -> Self {
        Self::from_kind(Arc::new(kind))
    }

    pub fn from_kind(kind: Arc<dyn ActionKind>) -> Self {
        Self {
            kind,
            label: None,
            description: None,
            state: State::Candidate,
        }
    }

    /// Builder-style label override for detached actions.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => self.kind.default_label(),
        }
    }

    pub fn description(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() => description,
            _ => self.kind.default_description(),
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> Result<(), ActionError> {
        self.ensure_editable()?;
        self.label = Some(label.into());
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), ActionError> {
        self.ensure_editable()?;
        self.description = Some(description.into());
        Ok(())
    }

    pub fn is_sync(&self) -> bool {
        self.kind.is_sync()
    }

    pub fn validate(&self) -> Vec<ActionError> {
        self.kind.validate()
    }

    pub fn kind(&self) -> &Arc<dyn ActionKind> {
        &self.kind
    }

    /// State of the run owning this action; `Candidate` when detached.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_editable(&self) -> bool {
        self.state.is_editable()
    }

    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }

    fn ensure_editable(&self) -> Result<(), ActionError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(ActionError::InvalidOperation(format!(
                "action '{}' can no longer be edited (state {})",
                self.label(),
                self.state
            )))
        }
    }

    /// Run a clone of this action on a fresh execution.
    pub fn execute(
        &self,
        target: Option<Target>,
        executor: Option<Arc<dyn Executor>>,
    ) -> Result<Arc<Execution>, ActionError> {
        Execution::new(self).execute(target, executor)
    }

    /// Like [`Action::execute`], reporting every outcome through the promise.
    pub fn execute_async(
        &self,
        target: Option<Target>,
        executor: Option<Arc<dyn Executor>>,
    ) -> Result<Promise, ActionError> {
        Execution::new(self).execute_async(target, executor)
    }
}

impl Clone for Action {
    /// Copies label, description and kind. The copy is always a detached
    /// candidate, whatever the state of the original.
    fn clone(&self) -> Self {
        Self {
            kind: Arc::clone(&self.kind),
            label: self.label.clone(),
            description: self.description.clone(),
            state: State::Candidate,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label())
            .field("description", &self.description())
            .field("is_sync", &self.is_sync())
            .field("state", &self.state)
            .finish()
    }
}
