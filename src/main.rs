//! # mdpane
//!
//! A single-window markdown viewer built with egui.
//!
//! mdpane shows one markdown file at a time:
//! - Pick a `.md` file with the native file dialog
//! - Read it rendered in the window, or open the full HTML document in a browser
//! - Window placement and the last file are restored on the next launch

mod app;
mod controller;
mod error;
mod markdown;
mod notify;
mod picker;
mod preview;
mod settings;

use app::MarkdownViewerApp;
use controller::ViewerController;
use markdown::PulldownConverter;
use notify::DialogNotifier;
use preview::DocumentPane;
use settings::SettingsStore;

/// Main entry point for mdpane.
///
/// Restores the previous session before the window exists so the stored
/// placement can be applied to the viewport.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init()
        .ok();

    let mut controller = ViewerController::new(
        SettingsStore::default(),
        Box::new(PulldownConverter),
        Box::new(DialogNotifier),
    );
    let mut pane = DocumentPane::new();
    let placement = controller.startup(&mut pane);

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([800.0, 600.0])
        .with_title("mdpane");
    if let Some([left, top]) = placement.position {
        viewport = viewport.with_position([left as f32, top as f32]);
    }
    if let Some([width, height]) = placement.size {
        viewport = viewport.with_inner_size([width as f32, height as f32]);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "mdpane",
        options,
        Box::new(move |_cc| Ok(Box::new(MarkdownViewerApp::new(controller, pane)))),
    )
    .map_err(|e| anyhow::anyhow!("could not run the window: {e}"))
}
