//! Session shell for a multi-window current-clamp recording viewer.
//!
//! [`session::Session`] is the core; [`app::ShellApp`] renders it with eframe.

pub mod app;
pub mod command;
pub mod error;
pub mod menu;
pub mod preferences;
pub mod session;
pub mod utils;
pub mod viewport;
pub mod window;

pub use command::Command;
pub use error::{PreferencesError, SessionError};
pub use preferences::Preferences;
pub use session::{Session, WindowSummary};
pub use window::{AnalysisWindow, WindowFactory, WindowGeometry, WindowId};
