use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use log::{info, warn, debug};

use crate::error::PreferencesError;
use crate::utils::{classify_path, PathKind, MAX_RECENT_PATHS};
use crate::window::WindowGeometry;

// On-disk layout of the preferences file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesData {
    pub window_geometry: WindowGeometry,
    pub use_dark_style: bool,
    pub recent_files: Vec<String>,
    pub recent_folders: Vec<String>,
    // Free-form scalar settings set through `Preferences::set`
    pub options: BTreeMap<String, Value>,
}

impl Default for PreferencesData {
    fn default() -> Self {
        Self {
            window_geometry: WindowGeometry::default(),
            use_dark_style: true,
            recent_files: Vec::new(),
            recent_folders: Vec::new(),
            options: BTreeMap::new(),
        }
    }
}

impl PreferencesData {
    /// Builds preferences key by key from a parsed file, so one missing or
    /// mistyped entry falls back to its own default and nothing else.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        if !value.is_mapping() {
            warn!("Preferences file is not a mapping. Using defaults.");
            return defaults;
        }

        let geometry = value.get("windowGeometry");
        let fallback = defaults.window_geometry;
        Self {
            window_geometry: WindowGeometry {
                x: field(geometry, "x", fallback.x),
                y: field(geometry, "y", fallback.y),
                width: field(geometry, "width", fallback.width),
                height: field(geometry, "height", fallback.height),
            },
            use_dark_style: field(Some(value), "useDarkStyle", defaults.use_dark_style),
            recent_files: path_list(value, "recentFiles"),
            recent_folders: path_list(value, "recentFolders"),
            options: field(Some(value), "options", defaults.options),
        }
    }
}

fn field<T: DeserializeOwned>(section: Option<&Value>, key: &str, default: T) -> T {
    match section.and_then(|s| s.get(key)) {
        None | Some(Value::Null) => default,
        Some(v) => serde_yaml::from_value(v.clone()).unwrap_or_else(|e| {
            warn!("Ignoring preference {:?}: {}", key, e);
            default
        }),
    }
}

// Non-string entries are dropped one by one
fn path_list(value: &Value, key: &str) -> Vec<String> {
    let Some(entries) = value.get(key).and_then(Value::as_sequence) else {
        return Vec::new();
    };
    let mut paths: Vec<String> = entries
        .iter()
        .filter_map(|entry| match entry.as_str() {
            Some(path) => Some(path.to_string()),
            None => {
                warn!("Ignoring non-path entry {:?} in {}", entry, key);
                None
            }
        })
        .collect();
    paths.truncate(MAX_RECENT_PATHS);
    paths
}

/// Persisted user preferences and the recent file/folder histories.
///
/// The in-memory copy is the source of truth for the running session; a
/// failed [`Preferences::save`] leaves it untouched.
pub struct Preferences {
    data: PreferencesData,
    file_path: PathBuf,
    dirty: bool,
}

impl Preferences {
    /// Loads preferences from `file_path`, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let data = match Self::read_file(&file_path) {
            Ok(Some(data)) => {
                info!("Loaded preferences from {}", file_path.display());
                data
            }
            Ok(None) => {
                info!("No preferences file at {}. Using defaults.", file_path.display());
                PreferencesData::default()
            }
            Err(e) => {
                warn!("{}. Using defaults.", e);
                PreferencesData::default()
            }
        };

        Self {
            data,
            file_path,
            dirty: false,
        }
    }

    fn read_file(file_path: &Path) -> Result<Option<PreferencesData>, PreferencesError> {
        if !file_path.exists() {
            return Ok(None);
        }
        let display = file_path.display().to_string();
        let yaml_str = fs::read_to_string(file_path).map_err(|source| PreferencesError::Io {
            path: display.clone(),
            source,
        })?;
        let value: Value = serde_yaml::from_str(&yaml_str)
            .map_err(|source| PreferencesError::Parse { path: display, source })?;
        Ok(Some(PreferencesData::from_value(&value)))
    }

    pub fn save(&mut self) -> Result<(), PreferencesError> {
        let yaml_str = serde_yaml::to_string(&self.data)?;
        let io_err = |source: std::io::Error| PreferencesError::Io {
            path: self.file_path.display().to_string(),
            source,
        };
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(&self.file_path, yaml_str).map_err(io_err)?;
        self.dirty = false;
        info!("Preferences saved to {}", self.file_path.display());
        Ok(())
    }

    /// Saves only when something changed since the last load or save.
    pub fn save_if_dirty(&mut self) -> Result<bool, PreferencesError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn data(&self) -> &PreferencesData {
        &self.data
    }

    pub fn recent_files(&self) -> &[String] {
        &self.data.recent_files
    }

    pub fn recent_folders(&self) -> &[String] {
        &self.data.recent_folders
    }

    /// Records `path` at the front of the file or folder history.
    ///
    /// The history is picked by asking the filesystem; paths that are neither
    /// are ignored.
    pub fn add_path(&mut self, path: &str) {
        let history = match classify_path(path) {
            Some(PathKind::File) => &mut self.data.recent_files,
            Some(PathKind::Folder) => &mut self.data.recent_folders,
            None => {
                warn!("Not adding {:?} to recent paths: not a file or folder", path);
                return;
            }
        };
        push_recent(history, path);
        self.dirty = true;
        debug!("Recorded recent path {:?}", path);
    }

    pub fn window_geometry(&self) -> WindowGeometry {
        self.data.window_geometry
    }

    pub fn set_window_geometry(&mut self, geometry: WindowGeometry) {
        if self.data.window_geometry != geometry {
            self.data.window_geometry = geometry;
            self.dirty = true;
        }
    }

    pub fn use_dark_style(&self) -> bool {
        self.data.use_dark_style
    }

    pub fn set_use_dark_style(&mut self, dark: bool) {
        if self.data.use_dark_style != dark {
            self.data.use_dark_style = dark;
            self.dirty = true;
        }
    }

    /// Reads a scalar setting by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        let geometry = &self.data.window_geometry;
        match key {
            "useDarkStyle" => Some(Value::Bool(self.data.use_dark_style)),
            "windowGeometry.x" => Some(number(geometry.x)),
            "windowGeometry.y" => Some(number(geometry.y)),
            "windowGeometry.width" => Some(number(geometry.width)),
            "windowGeometry.height" => Some(number(geometry.height)),
            _ => self.data.options.get(key).cloned(),
        }
    }

    /// Writes a scalar setting. Built-in keys are type checked; any other
    /// key is stored as a free-form option.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), PreferencesError> {
        if key == "useDarkStyle" {
            let dark = value.as_bool().ok_or_else(|| mismatch(key, "a boolean"))?;
            self.set_use_dark_style(dark);
            return Ok(());
        }

        if let Some(field) = key.strip_prefix("windowGeometry.") {
            let v = value.as_f64().ok_or_else(|| mismatch(key, "a number"))? as f32;
            let mut geometry = self.data.window_geometry;
            match field {
                "x" => geometry.x = v,
                "y" => geometry.y = v,
                "width" => geometry.width = v,
                "height" => geometry.height = v,
                _ => return Err(PreferencesError::UnknownKey(key.to_string())),
            }
            self.set_window_geometry(geometry);
            return Ok(());
        }

        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                self.data.options.insert(key.to_string(), value);
                self.dirty = true;
                Ok(())
            }
            _ => Err(mismatch(key, "a scalar value")),
        }
    }
}

fn number(v: f32) -> Value {
    Value::Number(serde_yaml::Number::from(v as f64))
}

fn mismatch(key: &str, expected: &'static str) -> PreferencesError {
    PreferencesError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

// Most recent first, no duplicates, bounded
fn push_recent(history: &mut Vec<String>, path: &str) {
    history.retain(|p| p != path);
    history.insert(0, path.to_string());
    history.truncate(MAX_RECENT_PATHS);
}
