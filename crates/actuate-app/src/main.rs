//! Actuate binary - composition root.
//!
//! 1. Parse CLI arguments
//! 2. Load configuration from TOML
//! 3. Initialise tracing
//! 4. Run the requested command against the action registry

mod cli;
mod observer;

use std::sync::Arc;

use actuate_action::{target, ActionRegistry, Execution, Executor};
use actuate_core::config::ActuateConfig;
use actuate_core::error::ActuateError;
use actuate_core::logging;
use clap::Parser;

use crate::cli::{CliArgs, Command};
use crate::observer::LoggingExecutor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ActuateConfig::load_or_default(&config_file);
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing.
    logging::init(&config.general)?;
    tracing::info!("Starting Actuate v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let mut registry = ActionRegistry::new();
    registry.register_defaults(&config.engine);

    match args.command {
        Command::List => {
            for name in registry.names() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Run {
            name,
            params,
            target: target_name,
            label,
            description,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(ActuateError::from)?;
            let mut action = registry.create(&name, &params).map_err(ActuateError::from)?;
            if let Some(label) = label {
                action.set_label(label).map_err(ActuateError::from)?;
            }
            if let Some(description) = description {
                action.set_description(description).map_err(ActuateError::from)?;
            }

            let execution = Execution::with_config(&action, config.engine.clone());
            let executor: Arc<dyn Executor> = Arc::new(LoggingExecutor);
            let promise = execution
                .execute_async(target_name.map(target), Some(executor))
                .map_err(ActuateError::from)?;
            let settlement = promise.await;

            let snapshot = execution.snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);

            match settlement {
                Ok(_) => Ok(()),
                Err(rejection) => {
                    tracing::warn!(action = %name, %rejection, "Action did not complete");
                    Err(ActuateError::Execution(rejection.to_string()).into())
                }
            }
        }
    }
}
