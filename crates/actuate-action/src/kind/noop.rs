//! Action that does nothing and succeeds.

use crate::action::ActionKind;

/// Synchronous action with no behavior. Runs straight to `did`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAction;

impl ActionKind for NoopAction {
    fn default_label(&self) -> &str {
        "No-op"
    }

    fn default_description(&self) -> &str {
        "Completes immediately without a result"
    }
}
