//! Action execution engine for Actuate.
//!
//! Drives cloneable, validatable actions through the
//! `init -> will -> do -> finally` lifecycle to exactly one outcome, for
//! synchronous and asynchronous actions alike.

pub mod action;
pub mod completion;
pub mod error;
pub mod execution;
pub mod executor;
pub mod kind;
pub mod promise;
pub mod reason;
pub mod registry;
pub mod state;

pub use action::{Action, ActionKind};
pub use completion::Completion;
pub use error::ActionError;
pub use execution::{target, Execution, ExecutionSnapshot, Target};
pub use executor::{Executor, Hooks};
pub use promise::{Promise, Settlement};
pub use reason::{Reason, Rejection};
pub use registry::ActionRegistry;
pub use state::{State, StateSet};
