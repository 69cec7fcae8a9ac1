//! # Controller Module
//!
//! The viewer's state machine, kept free of any UI toolkit so it can be driven
//! from tests. The window forwards its three lifecycle events here: startup,
//! the user pressing "Browse", and the window closing.

use crate::error::ViewerError;
use crate::markdown::{render_document, MarkdownConverter, RenderedDocument};
use crate::notify::Notifier;
use crate::picker::FilePicker;
use crate::settings::{AppSettings, Placement, SettingsStore, WindowGeometry};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Something that can display a rendered document.
pub trait HtmlView {
    fn show(&mut self, document: &RenderedDocument);
}

/// What the view is currently displaying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Empty,
    Showing(PathBuf),
}

pub struct ViewerController {
    store: SettingsStore,
    converter: Box<dyn MarkdownConverter>,
    notifier: Box<dyn Notifier>,
    state: DisplayState,
    /// Content of the path field. May differ from the shown file after a failed open.
    path_text: String,
}

impl ViewerController {
    pub fn new(
        store: SettingsStore,
        converter: Box<dyn MarkdownConverter>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            converter,
            notifier,
            state: DisplayState::Empty,
            path_text: String::new(),
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn path_text(&self) -> &str {
        &self.path_text
    }

    /// Restores the previous session.
    ///
    /// Returns the stored window placement; the caller applies it before the
    /// window is shown. A recorded file that no longer exists is skipped.
    pub fn startup(&mut self, view: &mut dyn HtmlView) -> Placement {
        let settings = match self.store.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                info!("No settings at {:?}, using defaults", self.store.path());
                return Placement::default();
            }
            Err(e) => {
                self.notifier
                    .warning(&format!("Error while loading the settings: {e}"));
                return Placement::default();
            }
        };

        match settings.restorable_path() {
            Some(path) => {
                self.path_text = settings.file_path.clone().unwrap_or_default();
                if let Err(e) = self.open_path(&path, view) {
                    self.report_open_error(&e);
                }
            }
            None => {
                if let Some(stale) = settings.file_path.as_deref().filter(|p| !p.is_empty()) {
                    warn!("Last file {stale:?} no longer exists, starting empty");
                }
            }
        }

        settings.placement()
    }

    /// Lets the user pick a file and shows it.
    ///
    /// Settings are saved only when the new file was shown.
    pub fn browse(
        &mut self,
        picker: &mut dyn FilePicker,
        view: &mut dyn HtmlView,
        geometry: WindowGeometry,
    ) {
        let start_dir = Path::new(&self.path_text).parent().map(Path::to_path_buf);
        let Some(path) = picker.choose(start_dir.as_deref()) else {
            debug!("File selection cancelled");
            return;
        };

        self.path_text = path.display().to_string();
        match self.open_path(&path, view) {
            Ok(()) => self.save(geometry),
            Err(e) => self.report_open_error(&e),
        }
    }

    /// Persists the live window state. Never prevents the window from closing.
    pub fn closing(&mut self, geometry: WindowGeometry) {
        self.save(geometry);
    }

    /// Reads, renders and shows `path`. On failure the view and state are untouched.
    pub fn open_path(&mut self, path: &Path, view: &mut dyn HtmlView) -> Result<(), ViewerError> {
        let markdown = fs::read_to_string(path).map_err(|source| ViewerError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let document = render_document(self.converter.as_ref(), &markdown)?;

        view.show(&document);
        self.state = DisplayState::Showing(path.to_path_buf());
        info!("Showing {:?}", path);
        Ok(())
    }

    fn save(&self, geometry: WindowGeometry) {
        let settings = AppSettings::capture(geometry, &self.path_text);
        if let Err(e) = self.store.save(&settings) {
            self.notifier
                .warning(&format!("Error while saving the settings: {e}"));
        }
    }

    fn report_open_error(&self, e: &ViewerError) {
        self.notifier
            .error(&format!("Error while reading the file: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::PulldownConverter;
    use crate::settings::SETTINGS_FILE;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Notice {
        Error(String),
        Warning(String),
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier(Rc<RefCell<Vec<Notice>>>);

    impl Notifier for RecordingNotifier {
        fn error(&self, message: &str) {
            self.0.borrow_mut().push(Notice::Error(message.to_string()));
        }

        fn warning(&self, message: &str) {
            self.0.borrow_mut().push(Notice::Warning(message.to_string()));
        }
    }

    #[derive(Default)]
    struct RecordingView {
        shown: Vec<RenderedDocument>,
    }

    impl HtmlView for RecordingView {
        fn show(&mut self, document: &RenderedDocument) {
            self.shown.push(document.clone());
        }
    }

    struct ScriptedPicker(VecDeque<Option<PathBuf>>);

    impl ScriptedPicker {
        fn new(answers: impl IntoIterator<Item = Option<PathBuf>>) -> Self {
            Self(answers.into_iter().collect())
        }
    }

    impl FilePicker for ScriptedPicker {
        fn choose(&mut self, _start_dir: Option<&Path>) -> Option<PathBuf> {
            self.0.pop_front().flatten()
        }
    }

    struct Fixture {
        dir: TempDir,
        notices: RecordingNotifier,
        view: RecordingView,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                notices: RecordingNotifier::default(),
                view: RecordingView::default(),
            }
        }

        fn store(&self) -> SettingsStore {
            SettingsStore::new(self.dir.path().join(SETTINGS_FILE))
        }

        fn controller(&self) -> ViewerController {
            ViewerController::new(
                self.store(),
                Box::new(PulldownConverter),
                Box::new(self.notices.clone()),
            )
        }

        fn markdown(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn notices(&self) -> Vec<Notice> {
            self.notices.0.borrow().clone()
        }
    }

    fn geometry() -> WindowGeometry {
        WindowGeometry {
            position: Some([40.0, 60.0]),
            size: Some([900.0, 700.0]),
        }
    }

    #[test]
    fn first_run_starts_empty_without_notices() {
        let mut fx = Fixture::new();
        let mut controller = fx.controller();

        let placement = controller.startup(&mut fx.view);

        assert_eq!(placement, Placement::default());
        assert_eq!(controller.state(), &DisplayState::Empty);
        assert_eq!(controller.path_text(), "");
        assert!(fx.view.shown.is_empty());
        assert!(fx.notices().is_empty());
    }

    #[test]
    fn startup_restores_placement_and_file() {
        let mut fx = Fixture::new();
        let file = fx.markdown("notes.md", "# Notes");
        fx.store()
            .save(&AppSettings::capture(geometry(), &file.display().to_string()))
            .unwrap();
        let mut controller = fx.controller();

        let placement = controller.startup(&mut fx.view);

        assert_eq!(placement.position, Some([40.0, 60.0]));
        assert_eq!(placement.size, Some([900.0, 700.0]));
        assert_eq!(controller.state(), &DisplayState::Showing(file.clone()));
        assert_eq!(controller.path_text(), file.display().to_string());
        assert_eq!(fx.view.shown.len(), 1);
        assert!(fx.view.shown[0].html.contains("<h1>Notes</h1>"));
    }

    #[test]
    fn stale_path_is_skipped_but_geometry_applies() {
        let mut fx = Fixture::new();
        let gone = fx.dir.path().join("gone.md");
        fx.store()
            .save(&AppSettings::capture(geometry(), &gone.display().to_string()))
            .unwrap();
        let mut controller = fx.controller();

        let placement = controller.startup(&mut fx.view);

        assert_eq!(placement.size, Some([900.0, 700.0]));
        assert_eq!(controller.state(), &DisplayState::Empty);
        assert!(fx.view.shown.is_empty());
        assert!(fx.notices().is_empty());
        // Ignored for this session, not cleared on disk.
        let on_disk = fx.store().load().unwrap().unwrap();
        assert_eq!(on_disk.file_path, Some(gone.display().to_string()));
    }

    #[test]
    fn startup_with_unreadable_restored_file_reports_and_stays_empty() {
        let mut fx = Fixture::new();
        let bad = fx.dir.path().join("bad.md");
        fs::write(&bad, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        fx.store()
            .save(&AppSettings::capture(geometry(), &bad.display().to_string()))
            .unwrap();
        let mut controller = fx.controller();

        let placement = controller.startup(&mut fx.view);

        assert_eq!(placement.size, Some([900.0, 700.0]));
        assert_eq!(controller.state(), &DisplayState::Empty);
        assert_eq!(controller.path_text(), bad.display().to_string());
        assert!(fx.view.shown.is_empty());
        assert!(matches!(fx.notices().as_slice(), [Notice::Error(m)] if m.contains("bad.md")));
    }

    #[test]
    fn corrupt_settings_warn_and_fall_back() {
        let mut fx = Fixture::new();
        fs::write(fx.store().path(), "not json at all").unwrap();
        let mut controller = fx.controller();

        let placement = controller.startup(&mut fx.view);

        assert_eq!(placement, Placement::default());
        assert_eq!(controller.state(), &DisplayState::Empty);
        assert!(matches!(fx.notices().as_slice(), [Notice::Warning(_)]));
    }

    #[test]
    fn browse_shows_file_and_saves_settings() {
        let mut fx = Fixture::new();
        let file = fx.markdown("a.md", "*hello*");
        let mut controller = fx.controller();
        let mut picker = ScriptedPicker::new([Some(file.clone())]);

        controller.browse(&mut picker, &mut fx.view, geometry());

        assert_eq!(controller.state(), &DisplayState::Showing(file.clone()));
        assert!(fx.view.shown[0].html.contains("<em>hello</em>"));
        let saved = fx.store().load().unwrap().unwrap();
        assert_eq!(saved, AppSettings::capture(geometry(), &file.display().to_string()));
    }

    #[test]
    fn cancelled_browse_changes_nothing() {
        let mut fx = Fixture::new();
        let file = fx.markdown("a.md", "first");
        let mut controller = fx.controller();
        controller.browse(&mut ScriptedPicker::new([Some(file.clone())]), &mut fx.view, WindowGeometry::default());
        let saved_before = fx.store().load().unwrap();

        controller.browse(&mut ScriptedPicker::new([None]), &mut fx.view, geometry());

        assert_eq!(controller.state(), &DisplayState::Showing(file.clone()));
        assert_eq!(controller.path_text(), file.display().to_string());
        assert_eq!(fx.view.shown.len(), 1);
        assert_eq!(fx.store().load().unwrap(), saved_before);
    }

    #[test]
    fn file_vanishing_before_read_keeps_previous_document() {
        let mut fx = Fixture::new();
        let first = fx.markdown("first.md", "first");
        let second = fx.markdown("second.md", "second");
        let mut controller = fx.controller();
        controller.browse(&mut ScriptedPicker::new([Some(first.clone())]), &mut fx.view, WindowGeometry::default());
        fs::remove_file(&second).unwrap();

        controller.browse(&mut ScriptedPicker::new([Some(second.clone())]), &mut fx.view, WindowGeometry::default());

        assert_eq!(controller.state(), &DisplayState::Showing(first.clone()));
        assert_eq!(controller.path_text(), second.display().to_string());
        assert_eq!(fx.view.shown.len(), 1);
        assert!(matches!(fx.notices().as_slice(), [Notice::Error(m)] if m.contains("second.md")));
        let saved = fx.store().load().unwrap().unwrap();
        assert_eq!(saved.file_path, Some(first.display().to_string()));
    }

    #[test]
    fn conversion_failure_is_reported() {
        struct Broken;
        impl MarkdownConverter for Broken {
            fn convert(&self, _markdown: &str) -> Result<String, ViewerError> {
                Err(ViewerError::Conversion("unsupported".to_string()))
            }
        }

        let mut fx = Fixture::new();
        let file = fx.markdown("a.md", "text");
        let mut controller =
            ViewerController::new(fx.store(), Box::new(Broken), Box::new(fx.notices.clone()));

        controller.browse(&mut ScriptedPicker::new([Some(file)]), &mut fx.view, WindowGeometry::default());

        assert_eq!(controller.state(), &DisplayState::Empty);
        assert!(fx.view.shown.is_empty());
        assert!(matches!(fx.notices().as_slice(), [Notice::Error(m)] if m.contains("unsupported")));
    }

    #[test]
    fn closing_saves_even_when_nothing_is_shown() {
        let fx = Fixture::new();
        let mut controller = fx.controller();

        controller.closing(geometry());

        let saved = fx.store().load().unwrap().unwrap();
        assert_eq!(saved.placement().position, Some([40.0, 60.0]));
        assert_eq!(saved.file_path, None);
    }

    #[test]
    fn closing_reports_save_failure() {
        let fx = Fixture::new();
        let store = SettingsStore::new(fx.dir.path().join("missing").join(SETTINGS_FILE));
        let mut controller = ViewerController::new(
            store,
            Box::new(PulldownConverter),
            Box::new(fx.notices.clone()),
        );

        controller.closing(geometry());

        assert!(matches!(fx.notices().as_slice(), [Notice::Warning(_)]));
    }
}
