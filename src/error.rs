//! Error types for the session core and the preferences store.

use thiserror::Error;

/// Failures surfaced by [`crate::session::Session`] operations.
///
/// Every variant is raised before any registry or cursor mutation, so the
/// session is unchanged when one of these comes back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The path is neither an existing file nor an existing folder
    #[error("Not a file or folder: {0}")]
    InvalidPath(String),

    /// The window factory could not build a window for a valid path
    #[error("Could not open window for {path}: {reason}")]
    WindowConstruction { path: String, reason: String },
}

impl SessionError {
    pub fn construction(path: Option<&str>, reason: impl ToString) -> Self {
        SessionError::WindowConstruction {
            path: path.unwrap_or("<chooser>").to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Unknown preference key: {0}")]
    UnknownKey(String),

    #[error("Preference {key} expects {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}
