//! Multi-window session: the registry of open analysis windows.
//!
//! A [`Session`] is owned by the UI loop and every mutation goes through its
//! methods. Open requests are deduplicated by the path string the caller
//! supplied, new windows are placed on a running geometry cursor, and a
//! window leaves the registry only when it reports its own close.

use log::{debug, error, info, warn};

use crate::error::SessionError;
use crate::preferences::Preferences;
use crate::utils::{classify_path, PathKind, WINDOW_OFFSET};
use crate::window::{AnalysisWindow, WindowFactory, WindowGeometry, WindowId};

struct SessionWindow<W> {
    id: WindowId,
    path: Option<String>,
    window: W,
}

/// Snapshot of one registry entry, used to build the window menu.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    pub id: WindowId,
    pub path: Option<String>,
    pub geometry: WindowGeometry,
    pub is_active: bool,
}

pub struct Session<F: WindowFactory> {
    factory: F,
    preferences: Preferences,
    registry: Vec<SessionWindow<F::Window>>,
    cursor: WindowGeometry,
    active: Option<WindowId>,
    chooser_visible: bool,
    next_id: u64,
}

impl<F: WindowFactory> Session<F> {
    /// Empty session with the chooser showing. The geometry cursor starts at
    /// the saved window geometry.
    pub fn new(factory: F, preferences: Preferences) -> Self {
        let cursor = preferences.window_geometry();
        info!("Session starting, window cursor at {:?}", cursor);
        Self {
            factory,
            preferences,
            registry: Vec::new(),
            cursor,
            active: None,
            chooser_visible: true,
            next_id: 1,
        }
    }

    /// Opens `path` in a window, or raises the window already showing it.
    ///
    /// `sweep` and `spike` are forwarded to the window only when `path` is a
    /// file. Nothing changes when an error is returned.
    pub fn open_path(
        &mut self,
        path: Option<&str>,
        sweep: Option<usize>,
        spike: Option<usize>,
    ) -> Result<WindowId, SessionError> {
        info!("open_path path:{:?} sweep:{:?} spike:{:?}", path, sweep, spike);

        let kind = match path {
            Some(p) => match classify_path(p) {
                Some(kind) => Some(kind),
                None => {
                    warn!("Did not open {:?}: not a file or folder", p);
                    return Err(SessionError::InvalidPath(p.to_string()));
                }
            },
            None => None,
        };

        let id = match self.find(path) {
            Some(id) => {
                info!("Raising existing {} for {:?}", id, path);
                id
            }
            None => self.spawn(path)?,
        };
        self.focus_window(id);

        if kind == Some(PathKind::File) {
            if let Some(entry) = self.registry.iter_mut().find(|e| e.id == id) {
                if let Some(sweep) = sweep {
                    entry.window.select_sweep(sweep);
                }
                if let Some(spike) = spike {
                    entry.window.select_spike(spike);
                }
            }
        }

        if let Some(p) = path {
            self.preferences.add_path(p);
        }

        if self.chooser_visible {
            debug!("Hiding chooser");
            self.chooser_visible = false;
        }

        Ok(id)
    }

    // Cursor is committed only after the factory succeeded
    fn spawn(&mut self, path: Option<&str>) -> Result<WindowId, SessionError> {
        let geometry = self.cursor.offset(WINDOW_OFFSET);
        let window = self.factory.create(path, geometry).map_err(|e| {
            error!("Window construction failed: {}", e);
            e
        })?;

        self.cursor = geometry;
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.registry.push(SessionWindow {
            id,
            path: path.map(str::to_string),
            window,
        });
        info!("Opened {} for {:?} at {:?}", id, path, geometry);
        Ok(id)
    }

    fn find(&self, path: Option<&str>) -> Option<WindowId> {
        self.registry
            .iter()
            .find(|e| e.path.as_deref() == path)
            .map(|e| e.id)
    }

    /// Drops a window the UI reported as closed. Unknown ids are ignored.
    pub fn close_window(&mut self, id: WindowId) {
        match self.registry.iter().position(|e| e.id == id) {
            Some(index) => {
                let removed = self.registry.remove(index);
                info!("Closed {} ({:?})", id, removed.path);
                if self.active == Some(id) {
                    self.active = None;
                }
            }
            None => debug!("close_window: {} is not open", id),
        }
    }

    /// Marks `id` active and raises it. Returns false for an unknown id.
    pub fn focus_window(&mut self, id: WindowId) -> bool {
        match self.registry.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.window.raise();
                self.active = Some(id);
                true
            }
            None => {
                debug!("focus_window: {} is not open", id);
                false
            }
        }
    }

    pub fn list_open_windows(&self) -> Vec<WindowSummary> {
        self.registry
            .iter()
            .map(|e| WindowSummary {
                id: e.id,
                path: e.path.clone(),
                geometry: e.window.geometry(),
                is_active: self.active == Some(e.id),
            })
            .collect()
    }

    pub fn window(&self, id: WindowId) -> Option<&F::Window> {
        self.registry.iter().find(|e| e.id == id).map(|e| &e.window)
    }

    /// All open windows in registry order, for rendering.
    pub fn windows_mut(&mut self) -> impl Iterator<Item = (WindowId, &mut F::Window)> + '_ {
        self.registry.iter_mut().map(|e| (e.id, &mut e.window))
    }

    pub fn is_active(&self, id: WindowId) -> bool {
        self.active == Some(id)
    }

    pub fn active_window(&self) -> Option<WindowId> {
        self.active
    }

    /// Geometry of the most recently placed window.
    pub fn cursor(&self) -> WindowGeometry {
        self.cursor
    }

    pub fn chooser_visible(&self) -> bool {
        self.chooser_visible
    }

    pub fn show_chooser(&mut self) {
        self.chooser_visible = true;
        self.active = None;
    }

    /// Called when the user closes the chooser itself.
    pub fn hide_chooser(&mut self) {
        self.chooser_visible = false;
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Persists preferences when they changed. Failures are logged only.
    pub fn shutdown(&mut self) {
        info!("Session shutting down with {} open windows", self.registry.len());
        match self.preferences.save_if_dirty() {
            Ok(true) => info!("Saved preferences on shutdown"),
            Ok(false) => debug!("Preferences unchanged"),
            Err(e) => error!("Could not save preferences: {}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    pub(crate) struct FakeWindow {
        pub path: Option<String>,
        pub geometry: WindowGeometry,
        pub raised: usize,
        pub sweep: Option<usize>,
        pub spike: Option<usize>,
    }

    impl AnalysisWindow for FakeWindow {
        fn path(&self) -> Option<&str> {
            self.path.as_deref()
        }
        fn geometry(&self) -> WindowGeometry {
            self.geometry
        }
        fn raise(&mut self) {
            self.raised += 1;
        }
        fn select_sweep(&mut self, sweep: usize) {
            self.sweep = Some(sweep);
        }
        fn select_spike(&mut self, spike: usize) {
            self.spike = Some(spike);
        }
        fn selected_sweep(&self) -> Option<usize> {
            self.sweep
        }
        fn selected_spike(&self) -> Option<usize> {
            self.spike
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeFactory {
        pub created: usize,
        pub failing: HashSet<String>,
    }

    impl WindowFactory for FakeFactory {
        type Window = FakeWindow;

        fn create(
            &mut self,
            path: Option<&str>,
            geometry: WindowGeometry,
        ) -> Result<FakeWindow, SessionError> {
            if let Some(p) = path {
                if self.failing.contains(p) {
                    return Err(SessionError::construction(path, "corrupt data"));
                }
            }
            self.created += 1;
            Ok(FakeWindow {
                path: path.map(str::to_string),
                geometry,
                ..Default::default()
            })
        }
    }

    pub(crate) struct Fixture {
        pub dir: TempDir,
        pub file_a: String,
        pub file_b: String,
        pub folder: String,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let file_a = dir.path().join("a.abf");
            let file_b = dir.path().join("b.abf");
            fs::write(&file_a, b"abf").unwrap();
            fs::write(&file_b, b"abf").unwrap();
            let folder = dir.path().join("cells");
            fs::create_dir(&folder).unwrap();
            Self {
                file_a: file_a.to_str().unwrap().to_string(),
                file_b: file_b.to_str().unwrap().to_string(),
                folder: folder.to_str().unwrap().to_string(),
                dir,
            }
        }

        pub fn session(&self) -> Session<FakeFactory> {
            self.session_with(FakeFactory::default())
        }

        pub fn session_with(&self, factory: FakeFactory) -> Session<FakeFactory> {
            let prefs = Preferences::load(self.dir.path().join("preferences.yaml"));
            Session::new(factory, prefs)
        }
    }

    #[test]
    fn reopening_a_path_raises_the_same_window() {
        let fx = Fixture::new();
        let mut session = fx.session();

        let first = session.open_path(Some(&fx.file_a), None, None).unwrap();
        let second = session.open_path(Some(&fx.file_a), None, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(session.list_open_windows().len(), 1);
        assert_eq!(session.factory.created, 1);
        assert_eq!(session.window(first).unwrap().raised, 2);
    }

    #[test]
    fn each_new_window_steps_the_cursor() {
        let fx = Fixture::new();
        let mut session = fx.session();
        let start = session.cursor();
        let paths = [&fx.file_a, &fx.file_b, &fx.folder];

        for (k, path) in paths.iter().enumerate() {
            let id = session.open_path(Some(path.as_str()), None, None).unwrap();
            let geometry = session.window(id).unwrap().geometry;
            let step = WINDOW_OFFSET * (k + 1) as f32;
            assert_eq!(geometry.x, start.x + step);
            assert_eq!(geometry.y, start.y + step);
            assert_eq!(geometry.width, start.width);
            assert_eq!(geometry.height, start.height);
        }
    }

    #[test]
    fn close_removes_by_identity_and_repeats_quietly() {
        let fx = Fixture::new();
        let mut session = fx.session();
        let a = session.open_path(Some(&fx.file_a), None, None).unwrap();
        let b = session.open_path(Some(&fx.file_b), None, None).unwrap();
        let cursor = session.cursor();

        session.close_window(a);
        assert!(session.list_open_windows().iter().all(|w| w.id != a));
        session.close_window(a);

        let open: Vec<_> = session.list_open_windows().iter().map(|w| w.id).collect();
        assert_eq!(open, vec![b]);
        assert_eq!(session.cursor(), cursor);
    }

    #[test]
    fn closing_the_active_window_clears_focus() {
        let fx = Fixture::new();
        let mut session = fx.session();
        let a = session.open_path(Some(&fx.file_a), None, None).unwrap();
        session.close_window(a);
        assert_eq!(session.active_window(), None);
        assert!(!session.focus_window(a));
    }

    #[test]
    fn missing_path_changes_nothing() {
        let fx = Fixture::new();
        let mut session = fx.session();
        session.open_path(Some(&fx.file_a), None, None).unwrap();
        let before = session.list_open_windows();
        let cursor = session.cursor();

        let err = session.open_path(Some("/nonexistent/path"), None, None).unwrap_err();

        assert_eq!(err, SessionError::InvalidPath("/nonexistent/path".into()));
        assert_eq!(session.list_open_windows(), before);
        assert_eq!(session.cursor(), cursor);
    }

    #[test]
    fn failed_construction_is_not_registered() {
        let fx = Fixture::new();
        let mut factory = FakeFactory::default();
        factory.failing.insert(fx.file_b.clone());
        let mut session = fx.session_with(factory);
        session.open_path(Some(&fx.file_a), None, None).unwrap();
        let cursor = session.cursor();

        let err = session.open_path(Some(&fx.file_b), None, None).unwrap_err();

        assert!(matches!(err, SessionError::WindowConstruction { .. }));
        assert_eq!(session.list_open_windows().len(), 1);
        assert_eq!(session.cursor(), cursor);
        assert!(!session.preferences().recent_files().contains(&fx.file_b));
    }

    #[test]
    fn opened_paths_land_in_separate_histories() {
        let fx = Fixture::new();
        let mut session = fx.session();
        session.open_path(Some(&fx.file_a), None, None).unwrap();
        session.open_path(Some(&fx.folder), None, None).unwrap();

        assert_eq!(session.preferences().recent_files().first(), Some(&fx.file_a));
        assert_eq!(session.preferences().recent_folders().first(), Some(&fx.folder));
        assert!(!session.preferences().recent_files().contains(&fx.folder));
    }

    #[test]
    fn sweep_and_spike_only_reach_file_windows() {
        let fx = Fixture::new();
        let mut session = fx.session();

        let file = session.open_path(Some(&fx.file_a), Some(3), Some(7)).unwrap();
        assert_eq!(session.window(file).unwrap().selected_sweep(), Some(3));
        assert_eq!(session.window(file).unwrap().selected_spike(), Some(7));

        let folder = session.open_path(Some(&fx.folder), Some(3), None).unwrap();
        assert_eq!(session.window(folder).unwrap().selected_sweep(), None);

        // Existing file window still takes a new selection
        session.open_path(Some(&fx.file_a), Some(5), None).unwrap();
        assert_eq!(session.window(file).unwrap().selected_sweep(), Some(5));
    }

    #[test]
    fn chooser_hides_after_first_open() {
        let fx = Fixture::new();
        let mut session = fx.session();
        assert!(session.chooser_visible());

        session.open_path(Some(&fx.folder), None, None).unwrap();
        assert!(!session.chooser_visible());

        session.show_chooser();
        assert!(session.chooser_visible());
    }

    #[test]
    fn pathless_window_is_deduplicated_too() {
        let fx = Fixture::new();
        let mut session = fx.session();
        let first = session.open_path(None, Some(2), None).unwrap();
        let second = session.open_path(None, None, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(session.window(first).unwrap().selected_sweep(), None);
        assert!(session.preferences().recent_files().is_empty());
    }

    #[test]
    fn dedup_compares_path_strings_exactly() {
        let fx = Fixture::new();
        let mut session = fx.session();
        let spelled_differently = format!("{}/../cells", fx.folder);

        let a = session.open_path(Some(&fx.folder), None, None).unwrap();
        let b = session.open_path(Some(&spelled_differently), None, None).unwrap();

        assert_ne!(a, b);
        assert_eq!(session.list_open_windows().len(), 2);
    }

    #[test]
    fn open_two_files_then_reopen_first() {
        let fx = Fixture::new();
        let mut session = fx.session();
        assert_eq!(session.cursor(), WindowGeometry::new(100.0, 100.0, 800.0, 600.0));

        let w1 = session.open_path(Some(&fx.file_a), None, None).unwrap();
        let windows = session.list_open_windows();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].geometry, WindowGeometry::new(120.0, 120.0, 800.0, 600.0));

        let w2 = session.open_path(Some(&fx.file_b), None, None).unwrap();
        let windows = session.list_open_windows();
        assert_eq!(windows.iter().map(|w| w.id).collect::<Vec<_>>(), vec![w1, w2]);
        assert_eq!(windows[1].geometry, WindowGeometry::new(140.0, 140.0, 800.0, 600.0));
        assert!(session.is_active(w2));

        let again = session.open_path(Some(&fx.file_a), None, None).unwrap();
        let windows = session.list_open_windows();
        assert_eq!(again, w1);
        assert_eq!(windows.len(), 2);
        assert!(windows[0].is_active);
        assert!(!windows[1].is_active);
    }

    #[test]
    fn shutdown_saves_dirty_preferences() {
        let fx = Fixture::new();
        let mut session = fx.session();
        session.open_path(Some(&fx.file_a), None, None).unwrap();
        assert!(session.preferences().is_dirty());

        session.shutdown();

        assert!(!session.preferences().is_dirty());
        let reloaded = Preferences::load(fx.dir.path().join("preferences.yaml"));
        assert_eq!(reloaded.recent_files(), &[fx.file_a.clone()]);
    }
}
