//! Named action factories.

use std::collections::HashMap;

use actuate_core::config::EngineConfig;
use serde_json::Value;

use crate::action::{Action, ActionKind};
use crate::error::ActionError;
use crate::kind::{DelayAction, EchoAction, NoopAction};

type Factory = Box<dyn Fn(&Value) -> Action + Send + Sync>;

/// Registry mapping names to action factories.
///
/// Every lookup builds a new detached action, so callers may edit what they
/// get back without affecting later lookups.
#[derive(Default)]
pub struct ActionRegistry {
    factories: HashMap<String, Factory>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Action + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            tracing::debug!(name = %name, "Replaced registered action");
        }
    }

    /// Register a parameterless kind.
    pub fn register_kind<K>(&mut self, name: impl Into<String>, kind: K)
    where
        K: ActionKind + Clone,
    {
        self.register(name, move |_| Action::new(kind.clone()));
    }

    /// Register the built-in `noop`, `echo` and `delay` actions.
    pub fn register_defaults(&mut self, config: &EngineConfig) {
        let config = config.clone();
        self.register_kind("noop", NoopAction);
        self.register("echo", |params| Action::new(EchoAction::from_params(params)));
        self.register("delay", move |params| {
            Action::new(DelayAction::from_params(params, &config))
        });
    }

    /// Build the action registered under `name`.
    pub fn create(&self, name: &str, params: &Value) -> Result<Action, ActionError> {
        self.factories
            .get(name)
            .map(|factory| factory(params))
            .ok_or_else(|| ActionError::UnregisteredAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register_defaults(&EngineConfig::default());
        registry
    }

    #[test]
    fn test_defaults_are_registered() {
        assert_eq!(defaults().names(), vec!["delay", "echo", "noop"]);
    }

    #[test]
    fn test_create_builds_fresh_actions() {
        let registry = defaults();
        let mut first = registry.create("echo", &json!({"message": "hi"})).unwrap();
        first.set_label("Edited").unwrap();

        let second = registry.create("echo", &json!({"message": "hi"})).unwrap();
        assert_eq!(second.label(), "Echo");
        assert!(second.validate().is_empty());
    }

    #[test]
    fn test_unknown_name_is_unregistered() {
        let err = defaults().create("launch", &Value::Null).unwrap_err();
        assert_eq!(err, ActionError::UnregisteredAction("launch".to_string()));
    }

    #[test]
    fn test_delay_respects_configured_cap() {
        let mut registry = ActionRegistry::new();
        registry.register_defaults(&EngineConfig {
            max_delay_ms: 5,
            ..EngineConfig::default()
        });
        let action = registry.create("delay", &json!({"millis": 6})).unwrap();
        assert!(!action.is_sync());
        assert_eq!(action.validate().len(), 1);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ActionRegistry::new();
        registry.register_kind("x", NoopAction);
        registry.register("x", |_| Action::new(EchoAction::new("replaced")));
        assert_eq!(registry.names(), vec!["x"]);
        assert_eq!(registry.create("x", &Value::Null).unwrap().label(), "Echo");
        assert!(registry.contains("x"));
        assert!(!registry.contains("y"));
    }
}
