//! Handler for the `run` command.

use std::path::Path;

use tracing::{error, info};

use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::runtime;

/// Load configuration, initialize logging and run the bot until Ctrl-C.
///
/// # Errors
/// Returns configuration errors and fatal startup errors.
pub async fn execute(config_path: Option<&Path>, args: &RunArgs) -> Result<()> {
    let mut config = Config::load(config_path)?;
    apply_overrides(&mut config, args);
    config.init_logging();

    info!(version = env!("CARGO_PKG_VERSION"), "sessionvault starting");
    let result = runtime::run(config).await;
    if let Err(e) = &result {
        error!(error = %e, "Fatal error");
    }
    result
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
}
