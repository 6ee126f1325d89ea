use eframe::egui;
use log::info;

use crate::command::Command;
use crate::session::{Session, WindowSummary};
use crate::window::WindowFactory;

/// What the menus need to know, captured once per frame.
pub struct MenuModel {
    pub recent_files: Vec<String>,
    pub recent_folders: Vec<String>,
    pub windows: Vec<WindowSummary>,
    pub dark: bool,
    pub chooser_visible: bool,
}

impl MenuModel {
    pub fn from_session<F: WindowFactory>(session: &Session<F>) -> Self {
        let prefs = session.preferences();
        Self {
            recent_files: prefs.recent_files().to_vec(),
            recent_folders: prefs.recent_folders().to_vec(),
            windows: session.list_open_windows(),
            dark: prefs.use_dark_style(),
            chooser_visible: session.chooser_visible(),
        }
    }
}

pub fn pick_file() -> Option<String> {
    rfd::FileDialog::new()
        .set_title("Select a raw data file")
        .pick_file()
        .map(|p| p.to_string_lossy().into_owned())
}

pub fn pick_folder() -> Option<String> {
    rfd::FileDialog::new()
        .set_title("Select folder with raw data files")
        .pick_folder()
        .map(|p| p.to_string_lossy().into_owned())
}

pub fn menu_bar(ui: &mut egui::Ui, model: &MenuModel, commands: &mut Vec<Command>) {
    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| file_menu(ui, model, commands));
        ui.menu_button("View", |ui| {
            let mut dark = model.dark;
            if ui.checkbox(&mut dark, "Dark Theme").clicked() {
                commands.push(Command::ToggleTheme);
                ui.close_menu();
            }
        });
        ui.menu_button("Window", |ui| window_menu(ui, model, commands));
        ui.menu_button("Help", |ui| {
            if ui.button("About patchview").clicked() {
                ui.ctx().data_mut(|d| d.insert_temp(egui::Id::new(ABOUT_ID), true));
                ui.close_menu();
            }
        });
    });
}

const ABOUT_ID: &str = "patchview-about";

/// Name/value rows shown in the about window
pub fn about_lines() -> Vec<(&'static str, String)> {
    vec![
        ("patchview version", env!("CARGO_PKG_VERSION").to_string()),
        ("Platform", format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)),
    ]
}

/// Shows the about window, as its own viewport, while it is open.
pub fn about_window(ctx: &egui::Context) {
    let id = egui::Id::new(ABOUT_ID);
    if !ctx.data(|d| d.get_temp::<bool>(id)).unwrap_or(false) {
        return;
    }

    let builder = egui::ViewportBuilder::default()
        .with_title("About patchview")
        .with_inner_size([320.0, 140.0]);
    ctx.show_viewport_immediate(egui::ViewportId::from_hash_of(ABOUT_ID), builder, |ctx, _class| {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Grid::new("about_grid").show(ui, |ui| {
                for (name, value) in about_lines() {
                    ui.label(name);
                    ui.label(value);
                    ui.end_row();
                }
            });
        });
        if ctx.input(|i| i.viewport().close_requested()) {
            ctx.data_mut(|d| d.insert_temp(id, false));
        }
    });
}

/// Warning line with a dismiss button. Returns true once dismissed.
pub fn error_banner(ctx: &egui::Context, message: &str) -> bool {
    let mut dismissed = false;
    egui::TopBottomPanel::bottom("error_banner").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.colored_label(ui.visuals().warn_fg_color, message);
            dismissed = ui.button("Dismiss").clicked();
        });
    });
    dismissed
}

fn file_menu(ui: &mut egui::Ui, model: &MenuModel, commands: &mut Vec<Command>) {
    if ui.button("Open...").clicked() {
        ui.close_menu();
        if let Some(path) = pick_file() {
            commands.push(Command::OpenFile(path));
        }
    }
    if ui.button("Open Folder...").clicked() {
        ui.close_menu();
        if let Some(path) = pick_folder() {
            commands.push(Command::OpenFolder(path));
        }
    }
    ui.menu_button("Open Recent", |ui| recent_entries(ui, model, commands));
    ui.separator();
    if ui.button("Save Preferences").clicked() {
        commands.push(Command::SavePreferences);
        ui.close_menu();
    }
}

// Files first, then folders
pub fn recent_entries(ui: &mut egui::Ui, model: &MenuModel, commands: &mut Vec<Command>) {
    if model.recent_files.is_empty() && model.recent_folders.is_empty() {
        ui.weak("No recent files or folders");
        return;
    }
    for path in &model.recent_files {
        if ui.button(path).clicked() {
            commands.push(Command::SelectRecent(path.clone()));
            ui.close_menu();
        }
    }
    ui.separator();
    for path in &model.recent_folders {
        if ui.button(path).clicked() {
            commands.push(Command::SelectRecent(path.clone()));
            ui.close_menu();
        }
    }
}

fn window_menu(ui: &mut egui::Ui, model: &MenuModel, commands: &mut Vec<Command>) {
    if ui
        .selectable_label(model.chooser_visible, "Open Files and Folders")
        .clicked()
    {
        commands.push(Command::ShowChooser);
        ui.close_menu();
    }
    ui.separator();
    for window in &model.windows {
        let label = window.path.as_deref().unwrap_or("Untitled");
        if ui.selectable_label(window.is_active, label).clicked() {
            info!("Window menu selected {} {:?}", window.id, window.path);
            commands.push(Command::FocusWindow(window.id));
            ui.close_menu();
        }
    }
}
