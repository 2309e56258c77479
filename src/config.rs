use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SyncError, ValidationError};
use crate::model::ViewMode;
use crate::timeline::{chart, Padding};

const APP_NAME: &str = "PmsTimeline";

/// Persisted user settings (lives in the OS config directory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Days of padding around the window in the split (list + grid) view.
    pub split_panel_padding: u32,
    /// Days of padding in the stand-alone calendar view.
    pub simple_padding: u32,
    /// Days added before the earliest and after the latest entry on the chart.
    pub chart_buffer_days: u32,
    pub min_day_width: f32,
    pub default_view: ViewMode,
    /// Snapshot file; `None` means [`Settings::default_data_file`].
    pub data_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            split_panel_padding: Padding::SPLIT_PANEL.0,
            simple_padding: Padding::SIMPLE.0,
            chart_buffer_days: chart::DEFAULT_BUFFER_DAYS,
            min_day_width: chart::MIN_DAY_WIDTH,
            default_view: ViewMode::Month,
            data_file: None,
        }
    }
}

impl Settings {
    /// Load from the standard location. See [`Settings::load_from`].
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields defaults silently; an unreadable or malformed
    /// one yields defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read settings, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), SyncError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SyncError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| SyncError::io(path, e))
    }

    /// Setting names accepted by [`Settings::set`].
    pub const KEYS: [&'static str; 6] = [
        "split_panel_padding",
        "simple_padding",
        "chart_buffer_days",
        "min_day_width",
        "default_view",
        "data_file",
    ];

    /// Change one setting from its text form. An empty `data_file` goes
    /// back to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        let days = |field: &'static str| {
            value
                .parse::<u32>()
                .map_err(|_| ValidationError::single(field, format!("'{value}' is not a number of days")))
        };
        match key {
            "split_panel_padding" => self.split_panel_padding = days("split_panel_padding")?,
            "simple_padding" => self.simple_padding = days("simple_padding")?,
            "chart_buffer_days" => self.chart_buffer_days = days("chart_buffer_days")?,
            "min_day_width" => {
                self.min_day_width = value
                    .parse::<f32>()
                    .ok()
                    .filter(|w| w.is_finite() && *w > 0.0)
                    .ok_or_else(|| ValidationError::single("min_day_width", "must be a positive width"))?;
            }
            "default_view" => {
                self.default_view = value
                    .parse()
                    .map_err(|e: String| ValidationError::single("default_view", e))?;
            }
            "data_file" => {
                self.data_file = Some(PathBuf::from(value)).filter(|p| !p.as_os_str().is_empty());
            }
            other => {
                return Err(ValidationError::single("key", format!("unknown setting '{other}'")));
            }
        }
        Ok(())
    }

    pub fn split_panel_padding(&self) -> Padding {
        Padding(self.split_panel_padding)
    }

    pub fn simple_padding(&self) -> Padding {
        Padding(self.simple_padding)
    }

    /// The configured snapshot file, or the default one.
    pub fn data_file(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(Self::default_data_file)
    }

    pub fn config_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.config_dir().join("settings.json"),
            None => PathBuf::from(".").join("settings.json"),
        }
    }

    pub fn default_data_file() -> PathBuf {
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.data_dir().join("projects.json"),
            None => PathBuf::from(".").join("projects.json"),
        }
    }
}
