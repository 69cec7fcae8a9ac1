//! # Error Module
//!
//! Failures the viewer can run into. None of them is fatal: every variant is
//! caught where it happens and shown to the user as a dialog.

use std::path::PathBuf;

/// Everything that can go wrong while showing a document or persisting settings.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The selected or restored markdown file could not be read.
    #[error("could not read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The markdown converter failed on the given text.
    #[error("markdown conversion failed: {0}")]
    Conversion(String),
    /// The settings file could not be read, parsed or written.
    #[error("settings file {}: {reason}", path.display())]
    SettingsIo { path: PathBuf, reason: String },
    /// The HTML preview could not be written or handed to the browser.
    #[error("could not open the preview {}: {source}", path.display())]
    Preview {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ViewerError {
    pub(crate) fn settings(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SettingsIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
