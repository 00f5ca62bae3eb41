//! # MVVM Template
//!
//! Command plumbing for view models, usable from any host that can bind to a
//! readiness query and an execute trigger.
//!
//! This crate provides:
//! - Single-flight async commands with cooperative cancellation
//! - Progress-reporting commands and composite commands
//! - Value converters between domain values and display primitives
//! - Localization with culture-change notification
//! - Key and view-model based page navigation

pub mod cli;
pub mod command;
pub mod config;
pub mod context;
pub mod converter;
pub mod domain;
pub mod i18n;
pub mod logging;
pub mod navigation;
pub mod port;
pub mod ui;

pub use command::{AsyncRelayCommand, CompositeCommand, OpenFileCommand, ProgressAsyncRelayCommand, ProgressSink};
pub use context::AppContext;
pub use domain::{
    error::{AppError, CommandError, ConvertError, NavigationError},
    outcome::ExecutionOutcome,
    parameter::Parameter
};
pub use port::command::Invocable;
