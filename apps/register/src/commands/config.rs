//! # Config Commands
//!
//! Prints the effective configuration (after file, environment and flags).

use serde::Serialize;
use tracing::debug;

use super::Context;
use crate::cli::ConfigCommand;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct ConfigPath {
    path: Option<String>,
    exists: bool,
}

pub fn handle(ctx: &Context, command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => {
            debug!("config show");
            let rendered = toml::to_string_pretty(&ctx.config)
                .map_err(|e| AppError::internal(format!("Could not render config: {}", e)))?;
            ctx.output.print(&ctx.config, |_| print!("{}", rendered))
        }
        ConfigCommand::Path => {
            let path = AppConfig::default_config_path();
            let info = ConfigPath {
                exists: path.as_ref().map_or(false, |p| p.exists()),
                path: path.map(|p| p.display().to_string()),
            };
            ctx.output.print(&info, |i| match &i.path {
                Some(path) if i.exists => println!("{}", path),
                Some(path) => println!("{} (not created)", path),
                None => println!("No config directory on this platform"),
            })
        }
    }
}
