//! # Settings Module
//!
//! Window placement and the last opened file, persisted as a small JSON file
//! in the working directory.

use crate::error::ViewerError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the settings file, relative to the working directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// The persisted configuration.
///
/// Every field is optional on disk. A missing geometry field means the platform
/// picks that part of the placement; a missing path means no file is restored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub window_left: Option<f64>,
    pub window_top: Option<f64>,
    pub window_width: Option<f64>,
    pub window_height: Option<f64>,
    pub file_path: Option<String>,
}

/// Live window geometry, as observed from the running window.
///
/// Some platforms (Wayland) never report a position, so each half is tracked
/// on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowGeometry {
    pub position: Option<[f64; 2]>,
    pub size: Option<[f64; 2]>,
}

/// Where the window should open, as far as the settings know.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub position: Option<[f64; 2]>,
    pub size: Option<[f64; 2]>,
}

impl AppSettings {
    /// Builds a fresh settings value from the live window and the path field.
    pub fn capture(geometry: WindowGeometry, path_text: &str) -> Self {
        Self {
            window_left: geometry.position.map(|[left, _]| left),
            window_top: geometry.position.map(|[_, top]| top),
            window_width: geometry.size.map(|[width, _]| width),
            window_height: geometry.size.map(|[_, height]| height),
            file_path: (!path_text.is_empty()).then(|| path_text.to_string()),
        }
    }

    /// Stored placement. Values are passed through unchecked.
    pub fn placement(&self) -> Placement {
        let position = match (self.window_left, self.window_top) {
            (Some(left), Some(top)) => Some([left, top]),
            _ => None,
        };
        let size = match (self.window_width, self.window_height) {
            (Some(width), Some(height)) => Some([width, height]),
            _ => None,
        };
        Placement { position, size }
    }

    /// The last file, if one is recorded and it still exists.
    pub fn restorable_path(&self) -> Option<PathBuf> {
        self.file_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.is_file())
    }
}

/// Reads and writes [`AppSettings`] at a fixed location.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(SETTINGS_FILE)
    }
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings.
    ///
    /// Returns `Ok(None)` on first run, when the file does not exist yet.
    pub fn load(&self) -> Result<Option<AppSettings>, ViewerError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| ViewerError::settings(&self.path, e))?;
        let settings: AppSettings =
            serde_json::from_str(&content).map_err(|e| ViewerError::settings(&self.path, e))?;

        info!("Loaded settings from {:?}", self.path);
        Ok(Some(settings))
    }

    /// Overwrites the settings file with `settings`.
    pub fn save(&self, settings: &AppSettings) -> Result<(), ViewerError> {
        let content =
            serde_json::to_string_pretty(settings).map_err(|e| ViewerError::settings(&self.path, e))?;
        fs::write(&self.path, content).map_err(|e| ViewerError::settings(&self.path, e))?;

        info!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
