use std::path::PathBuf;

/// Host-provided file dialog
pub trait FilePicker: Send + Sync {
    /// Ask the user for a file. `Ok(None)` means the dialog was dismissed.
    fn pick_file(&self) -> anyhow::Result<Option<PathBuf>>;
}
