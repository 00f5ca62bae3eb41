//! # MVVM Template CLI
//!
//! Drives the command, converter, localization and navigation plumbing from a terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Create the configuration directory and seed translations
//! mvvm init
//!
//! # Run three commands as one composite; Ctrl-C cancels them all
//! mvvm run --steps 30 --delay-ms 50
//!
//! # Convert a value with a built-in or declared converter
//! mvvm convert number_to_brush 80
//!
//! # Walk the demo pages and go back once
//! mvvm navigate home about --back 1
//! ```
//!
//! Log verbosity comes from `RUST_LOG`, falling back to `log_level` in the settings file.

use anyhow::Result;
use clap::Parser;
use mvvm::{
    cli::{
        Cli, Commands, ConvertRequest, handle_convert_command, handle_init_command, handle_lang_command,
        handle_navigate_command, handle_open_command, handle_run_command
    },
    config::AppConfig,
    context::AppContext,
    logging
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config_dir {
        Some(dir) => AppConfig::at(dir),
        None => AppConfig::from_project_dirs()?
    };
    logging::init(&config)?;
    let context = AppContext::load(config)?;

    match &cli.command {
        Commands::Init => handle_init_command(&context).await,
        Commands::Run { steps, delay_ms, fail } => handle_run_command(&context, *steps, *delay_ms, *fail).await,
        Commands::Lang { command } => handle_lang_command(&context, command).await,
        Commands::Convert { name, values, param, file, back, list } => handle_convert_command(
            &context,
            ConvertRequest {
                name:   name.as_deref(),
                values,
                param:  param.as_deref(),
                file:   file.as_deref(),
                back:   *back,
                list:   *list
            }
        ),
        Commands::Open => handle_open_command(&context).await,
        Commands::Navigate { keys, back } => handle_navigate_command(&context, keys, *back)
    }
}
