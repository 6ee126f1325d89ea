use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SessionError;
use crate::utils::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_X, DEFAULT_WINDOW_Y,
};

/// Screen placement of a top-level window, in logical points.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WindowGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: DEFAULT_WINDOW_X,
            y: DEFAULT_WINDOW_Y,
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl WindowGeometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Same size, shifted by `offset` along both axes
    pub fn offset(&self, offset: f32) -> Self {
        Self {
            x: self.x + offset,
            y: self.y + offset,
            ..*self
        }
    }
}

/// Opaque handle to one registry entry of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub(crate) u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// One open top-level analysis window as the session sees it.
pub trait AnalysisWindow {
    fn path(&self) -> Option<&str>;
    fn geometry(&self) -> WindowGeometry;

    /// Bring to front. The session tracks which window is active.
    fn raise(&mut self);

    fn select_sweep(&mut self, sweep: usize);
    fn select_spike(&mut self, spike: usize);
    fn selected_sweep(&self) -> Option<usize>;
    fn selected_spike(&self) -> Option<usize>;
}

/// Builds analysis windows for the session.
///
/// Construction is synchronous: the returned window is immediately usable
/// for raise and selection calls.
pub trait WindowFactory {
    type Window: AnalysisWindow;

    fn create(
        &mut self,
        path: Option<&str>,
        geometry: WindowGeometry,
    ) -> Result<Self::Window, SessionError>;
}
