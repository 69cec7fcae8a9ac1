//! # Application Module
//!
//! The eframe window: a path field with a "Browse" button on top and the
//! document pane below. All decisions are made by the [`ViewerController`];
//! this module only forwards window events and reports live geometry.

use crate::controller::{DisplayState, ViewerController};
use crate::notify::{DialogNotifier, Notifier};
use crate::picker::DialogPicker;
use crate::preview::DocumentPane;
use crate::settings::WindowGeometry;
use egui::*;
use log::info;

pub struct MarkdownViewerApp {
    controller: ViewerController,
    pane: DocumentPane,
    picker: DialogPicker,
    notifier: DialogNotifier,
    /// Last geometry reported by the viewport
    geometry: WindowGeometry,
    /// Whether the file open dialog should be shown
    show_open_dialog: bool,
    close_handled: bool,
}

impl MarkdownViewerApp {
    pub fn new(controller: ViewerController, pane: DocumentPane) -> Self {
        Self {
            controller,
            pane,
            picker: DialogPicker,
            notifier: DialogNotifier,
            geometry: WindowGeometry::default(),
            show_open_dialog: false,
            close_handled: false,
        }
    }

    fn track_geometry(&mut self, ctx: &Context) {
        let (outer, inner) = ctx.input(|i| (i.viewport().outer_rect, i.viewport().inner_rect));
        self.geometry = viewport_geometry(outer, inner, ctx.screen_rect());
    }

    fn show_path_bar(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("path_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Browse").clicked() {
                    self.show_open_dialog = true;
                }
                let mut path_text = self.controller.path_text().to_string();
                ui.add(
                    egui::TextEdit::singleline(&mut path_text)
                        .interactive(false)
                        .hint_text("No file selected")
                        .desired_width(f32::INFINITY),
                );
            });
            ui.add_space(4.0);
        });
    }

    fn handle_file_dialog(&mut self) {
        if self.show_open_dialog {
            self.show_open_dialog = false;
            self.controller
                .browse(&mut self.picker, &mut self.pane, self.geometry);
        }
    }

    fn show_document(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Open in browser").clicked() {
                    match self.pane.open_in_browser() {
                        Ok(path) => info!("Opened preview {:?}", path),
                        Err(e) => self.notifier.error(&e.to_string()),
                    }
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.add_space(10.0);
                self.pane.ui(ui);
            });
    }

    fn show_empty_state(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("No document loaded");
            ui.add_space(10.0);
            if ui.button("Choose File").clicked() {
                self.show_open_dialog = true;
            }
        });
    }
}

/// Position and size of the window, each taken when the platform reports it.
///
/// Without a window position (Wayland) the screen rect still gives the size.
fn viewport_geometry(outer: Option<Rect>, inner: Option<Rect>, screen: Rect) -> WindowGeometry {
    let size = inner.unwrap_or(screen).size();
    WindowGeometry {
        position: outer.map(|r| [r.min.x as f64, r.min.y as f64]),
        size: Some([size.x as f64, size.y as f64]),
    }
}

impl eframe::App for MarkdownViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.track_geometry(ctx);
        self.show_path_bar(ctx);
        self.handle_file_dialog();

        egui::CentralPanel::default().show(ctx, |ui| {
            if matches!(self.controller.state(), DisplayState::Showing(_)) {
                self.show_document(ui);
            } else {
                self.show_empty_state(ui);
            }
        });

        if ctx.input(|i| i.viewport().close_requested()) && !self.close_handled {
            self.close_handled = true;
            self.controller.closing(self.geometry);
        }
    }
}
