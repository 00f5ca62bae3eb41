//! Invocable commands: single-flight async, progress reporting, composite and file-open

pub(crate) mod execution;

pub mod composite;
pub mod open_file;
pub mod progress;
pub mod relay;

pub use composite::CompositeCommand;
pub use open_file::OpenFileCommand;
pub use progress::{ProgressAsyncRelayCommand, ProgressSink};
pub use relay::AsyncRelayCommand;
