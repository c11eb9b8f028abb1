//! Native dialogs the host needs from its platform layer.

use std::path::{Path, PathBuf};

use crate::ipc::SurfaceId;

pub const UNABLE_TO_SAVE: &str = "Unable to save document";
pub const UNABLE_TO_OPEN: &str = "Unable to open document";

pub const SAVE_FAILED_DETAIL: &str = "An unexpected error occurred and your document was not saved. \
     Please try again, and if the issue persists, file a bug report.";
pub const READ_FAILED_DETAIL: &str = "An unexpected error occurred and your document could not be opened. \
     Please try again, and if the issue persists, file a bug report.";
pub const UNREADABLE_FILE_DETAIL: &str =
    "The file is damaged or was written by a newer version of Olive.";

/// Blocking, window-modal dialogs.
pub trait Dialogs {
    /// Ask for an existing `.oli` file. `None` when cancelled.
    fn choose_open_path(&self, window: SurfaceId) -> Option<PathBuf>;

    /// Ask where to save, starting from `default`. `None` when cancelled.
    fn choose_save_path(&self, window: SurfaceId, default: Option<&Path>) -> Option<PathBuf>;

    /// Show an error box.
    fn show_error(&self, title: &str, message: &str);
}
