use eframe::egui;
use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::command::Command;
use crate::error::SessionError;
use crate::menu::{self, MenuModel};
use crate::utils::{classify_path, format_size, is_data_file, PathKind};
use crate::window::{AnalysisWindow, WindowFactory, WindowGeometry, WindowId};

/// What an analysis window was bound to when it was built.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowContent {
    Empty,
    File { name: String, size: u64 },
    Folder { files: Vec<String> },
}

/// An analysis window drawn as its own OS-level egui viewport.
pub struct ViewportWindow {
    path: Option<String>,
    geometry: WindowGeometry,
    viewport_id: egui::ViewportId,
    content: WindowContent,
    sweep: Option<usize>,
    spike: Option<usize>,
    focus_pending: bool,
}

impl ViewportWindow {
    pub fn content(&self) -> &WindowContent {
        &self.content
    }

    fn title(&self) -> String {
        match &self.path {
            Some(path) => format!("patchview - {}", path),
            None => "patchview".to_string(),
        }
    }

    /// Draws the window and queues whatever the user asked for. Returns true
    /// when the user dismissed `error`.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        id: WindowId,
        model: &MenuModel,
        error: Option<&str>,
        commands: &mut Vec<Command>,
    ) -> bool {
        let geometry = self.geometry;
        let builder = egui::ViewportBuilder::default()
            .with_title(self.title())
            .with_position([geometry.x, geometry.y])
            .with_inner_size([geometry.width, geometry.height]);

        ctx.show_viewport_immediate(self.viewport_id, builder, |ctx, _class| {
            if self.focus_pending {
                ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
                self.focus_pending = false;
            }

            egui::TopBottomPanel::top("menu").show(ctx, |ui| {
                menu::menu_bar(ui, model, commands);
            });
            let dismissed = match error {
                Some(message) => menu::error_banner(ctx, message),
                None => false,
            };
            egui::CentralPanel::default().show(ctx, |ui| self.contents(ui, commands));

            let (close, focused) = ctx.input(|i| {
                (i.viewport().close_requested(), i.viewport().focused.unwrap_or(false))
            });
            if close {
                debug!("{} asked to close", id);
                commands.push(Command::CloseWindow(id));
            } else if focused && !model.windows.iter().any(|w| w.id == id && w.is_active) {
                commands.push(Command::FocusWindow(id));
            }
            dismissed
        })
    }

    fn contents(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        match &self.content {
            WindowContent::Empty => {
                ui.label("No file or folder loaded.");
            }
            WindowContent::File { name, size } => {
                ui.heading(name.as_str());
                ui.label(format_size(*size));
                ui.separator();
                ui.horizontal(|ui| {
                    selection_field(ui, "Sweep", &mut self.sweep);
                    selection_field(ui, "Spike", &mut self.spike);
                });
            }
            WindowContent::Folder { files } => {
                ui.label(format!("{} raw data files", files.len()));
                ui.separator();
                let folder = self.path.clone().unwrap_or_default();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for file in files {
                        if ui.link(file.as_str()).clicked() {
                            let full = Path::new(&folder).join(file);
                            commands.push(Command::OpenFile(full.to_string_lossy().into_owned()));
                        }
                    }
                });
            }
        }
    }
}

fn selection_field(ui: &mut egui::Ui, label: &str, value: &mut Option<usize>) {
    ui.label(label);
    let mut current = value.unwrap_or(0);
    if ui.add(egui::DragValue::new(&mut current).clamp_range(0..=usize::MAX)).changed() {
        *value = Some(current);
    }
}

impl AnalysisWindow for ViewportWindow {
    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    fn raise(&mut self) {
        self.focus_pending = true;
    }

    fn select_sweep(&mut self, sweep: usize) {
        info!("Selecting sweep {} in {:?}", sweep, self.path);
        self.sweep = Some(sweep);
    }

    fn select_spike(&mut self, spike: usize) {
        info!("Selecting spike {} in {:?}", spike, self.path);
        self.spike = Some(spike);
    }

    fn selected_sweep(&self) -> Option<usize> {
        self.sweep
    }

    fn selected_spike(&self) -> Option<usize> {
        self.spike
    }
}

/// Builds [`ViewportWindow`]s, reading just enough from disk to fail early on
/// unreadable paths.
#[derive(Default)]
pub struct ViewportFactory {
    created: u64,
}

impl ViewportFactory {
    fn load(path: &str) -> Result<WindowContent, SessionError> {
        let fail = |e: std::io::Error| SessionError::construction(Some(path), e);
        match classify_path(path) {
            Some(PathKind::File) => {
                // Opening proves the file is readable, not just present
                let file = fs::File::open(path).map_err(fail)?;
                let size = file.metadata().map_err(fail)?.len();
                let name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                Ok(WindowContent::File { name, size })
            }
            Some(PathKind::Folder) => {
                let mut files = Vec::new();
                for entry in fs::read_dir(path).map_err(fail)? {
                    let entry = entry.map_err(fail)?;
                    let entry_path = entry.path();
                    if entry_path.is_file() && is_data_file(&entry_path) {
                        files.push(entry.file_name().to_string_lossy().into_owned());
                    }
                }
                files.sort();
                Ok(WindowContent::Folder { files })
            }
            None => Err(SessionError::construction(Some(path), "path disappeared")),
        }
    }
}

impl WindowFactory for ViewportFactory {
    type Window = ViewportWindow;

    fn create(
        &mut self,
        path: Option<&str>,
        geometry: WindowGeometry,
    ) -> Result<ViewportWindow, SessionError> {
        let content = match path {
            Some(p) => Self::load(p)?,
            None => WindowContent::Empty,
        };
        self.created += 1;
        let viewport_id = egui::ViewportId::from_hash_of(("patchview-window", self.created));
        debug!("Built viewport {:?} for {:?}", viewport_id, path);

        Ok(ViewportWindow {
            path: path.map(str::to_string),
            geometry,
            viewport_id,
            content,
            sweep: None,
            spike: None,
            focus_pending: true,
        })
    }
}
