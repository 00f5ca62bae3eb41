//! Command-line surface of the demo binary

mod args;
mod commands;
pub mod demo;

pub use args::{Cli, Commands, LangCommands};
pub use commands::{
    ConvertRequest, describe_outcome, handle_convert_command, handle_init_command, handle_lang_command,
    handle_navigate_command, handle_open_command, handle_run_command
};
