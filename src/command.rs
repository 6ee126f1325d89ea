use log::{error, info, warn};

use crate::error::SessionError;
use crate::session::Session;
use crate::utils::{classify_path, PathKind};
use crate::window::{WindowFactory, WindowId};

/// Everything the menus and the chooser can ask the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenFile(String),
    OpenFolder(String),
    SelectRecent(String),
    FocusWindow(WindowId),
    CloseWindow(WindowId),
    ShowChooser,
    ToggleTheme,
    SavePreferences,
}

impl<F: WindowFactory> Session<F> {
    /// Runs one command. Returns the window that ended up in front, if any.
    pub fn dispatch(&mut self, command: Command) -> Result<Option<WindowId>, SessionError> {
        info!("dispatch {:?}", command);
        match command {
            Command::OpenFile(path) => {
                require_kind(&path, PathKind::File)?;
                self.open_path(Some(&path), None, None).map(Some)
            }
            Command::OpenFolder(path) => {
                require_kind(&path, PathKind::Folder)?;
                self.open_path(Some(&path), None, None).map(Some)
            }
            Command::SelectRecent(path) => self.open_path(Some(&path), None, None).map(Some),
            Command::FocusWindow(id) => Ok(self.focus_window(id).then_some(id)),
            Command::CloseWindow(id) => {
                self.close_window(id);
                Ok(None)
            }
            Command::ShowChooser => {
                self.show_chooser();
                Ok(None)
            }
            Command::ToggleTheme => {
                let prefs = self.preferences_mut();
                let dark = !prefs.use_dark_style();
                prefs.set_use_dark_style(dark);
                info!("Theme is now {}", if dark { "dark" } else { "light" });
                Ok(None)
            }
            Command::SavePreferences => {
                if let Err(e) = self.preferences_mut().save() {
                    error!("Could not save preferences: {}", e);
                }
                Ok(None)
            }
        }
    }
}

fn require_kind(path: &str, expected: PathKind) -> Result<(), SessionError> {
    if classify_path(path) == Some(expected) {
        Ok(())
    } else {
        warn!("Did not load {:?}: expected a {:?}", path, expected);
        Err(SessionError::InvalidPath(path.to_string()))
    }
}
