//! User-facing notifications.

use log::{error, warn};

/// Shows a failure to the user. Implementations must not abort the program.
pub trait Notifier {
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Modal message boxes through rfd.
#[derive(Debug, Default)]
pub struct DialogNotifier;

impl DialogNotifier {
    fn show(&self, level: rfd::MessageLevel, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

impl Notifier for DialogNotifier {
    fn error(&self, message: &str) {
        error!("{message}");
        self.show(rfd::MessageLevel::Error, "Error", message);
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
        self.show(rfd::MessageLevel::Warning, "Warning", message);
    }
}
