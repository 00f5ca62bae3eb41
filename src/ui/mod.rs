//! Terminal front-end pieces used by the binary

pub mod picker;
pub mod progress;

pub use picker::PromptFilePicker;
