//! Built-in action kinds.
//!
//! Each kind is built from a JSON parameter object so it can be created by
//! name through the [`ActionRegistry`](crate::registry::ActionRegistry).

pub mod delay;
pub mod echo;
pub mod noop;

pub use delay::DelayAction;
pub use echo::EchoAction;
pub use noop::NoopAction;
