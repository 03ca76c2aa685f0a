pub mod config;
pub mod error;
pub mod logging;

pub use config::{ActuateConfig, EngineConfig, GeneralConfig, LogFormat, LogLevel};
pub use error::{ActuateError, Result};
