use std::fs;
use std::path::Path;

use log::debug;

pub const WINDOW_OFFSET: f32 = 20.0;  // Shift applied to each newly placed window
pub const MAX_RECENT_PATHS: usize = 10;  // Length cap for each recent-path history
pub const DEFAULT_WINDOW_X: f32 = 100.0;
pub const DEFAULT_WINDOW_Y: f32 = 100.0;
pub const DEFAULT_WINDOW_WIDTH: f32 = 800.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 600.0;
pub const CHOOSER_SIZE: [f32; 2] = [520.0, 420.0];

// Raw data extensions listed in a folder window
pub const DATA_EXTENSIONS: [&str; 5] = ["abf", "atf", "csv", "tif", "dat"];

/// What a path on disk turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Folder,
}

/// Classifies `path` by asking the filesystem. `None` when it is neither an
/// existing file nor an existing folder.
pub fn classify_path(path: &str) -> Option<PathKind> {
    let kind = match fs::metadata(Path::new(path)) {
        Ok(meta) if meta.is_file() => Some(PathKind::File),
        Ok(meta) if meta.is_dir() => Some(PathKind::Folder),
        _ => None,
    };
    debug!("Classified {:?} as {:?}", path, kind);
    kind
}

pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DATA_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Human readable byte count for the file window header
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
