//! CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use this configuration directory instead of the platform one
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration directories and copy default files
    Init,
    /// Run a composite of demo commands with live progress; Ctrl-C cancels
    Run {
        /// Steps each command performs
        #[arg(long, default_value_t = 20)]
        steps:    u32,
        /// Delay per step in milliseconds
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,
        /// Make the indexing command fail halfway
        #[arg(long)]
        fail:     bool
    },
    /// Language management commands
    Lang {
        #[command(subcommand)]
        command: LangCommands
    },
    /// Convert values with a named converter
    Convert {
        /// Converter name (see `converters.yaml` or the built-in kinds)
        name:   Option<String>,
        /// Input values; more than one for multi-value converters
        values: Vec<String>,
        /// Converter parameter
        #[arg(long)]
        param:  Option<String>,
        /// YAML file declaring converters
        #[arg(long, value_name = "FILE")]
        file:   Option<PathBuf>,
        /// Convert back instead of forward
        #[arg(long)]
        back:   bool,
        /// List converter names
        #[arg(long)]
        list:   bool
    },
    /// Pick a file and report it
    Open,
    /// Navigate through the demo pages
    Navigate {
        /// Route keys to visit in order
        keys: Vec<String>,
        /// Go back this many times afterwards
        #[arg(long, default_value_t = 0)]
        back: u32
    }
}

#[derive(Subcommand)]
pub enum LangCommands {
    /// Set the current language
    Set {
        /// Language code (e.g., 'en', 'es')
        language: String
    },
    /// List available languages
    List,
    /// Show current language
    Current
}
