//! Native "open file" dialog.

use std::path::{Path, PathBuf};

/// Asks the user for a file. `None` means the dialog was dismissed.
pub trait FilePicker {
    fn choose(&mut self, start_dir: Option<&Path>) -> Option<PathBuf>;
}

/// The platform file dialog, via rfd.
#[derive(Debug, Default)]
pub struct DialogPicker;

impl FilePicker for DialogPicker {
    fn choose(&mut self, start_dir: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Open markdown file")
            .add_filter("Markdown files (*.md)", &["md"])
            .add_filter("All files (*.*)", &["*"]);
        if let Some(dir) = start_dir.filter(|d| d.is_dir()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }
}
