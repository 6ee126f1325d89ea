use eframe::egui;
use log::{info, warn};

use crate::command::Command;
use crate::menu::{self, MenuModel};
use crate::session::Session;
use crate::viewport::ViewportFactory;

/// eframe application: the root viewport is the chooser, every analysis
/// window is an extra viewport owned by the session.
pub struct ShellApp {
    session: Session<ViewportFactory>,
    last_error: Option<String>,
    chooser_shown: bool,
}

impl ShellApp {
    pub fn new(session: Session<ViewportFactory>, last_error: Option<String>) -> Self {
        Self {
            session,
            last_error,
            chooser_shown: true,
        }
    }

    fn show_chooser(&mut self, ctx: &egui::Context, model: &MenuModel, commands: &mut Vec<Command>) {
        // Hidden chooser is minimized so the root keeps driving the other viewports
        let visible = self.session.chooser_visible();
        if visible != self.chooser_shown {
            ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(!visible));
            if visible {
                ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            }
            self.chooser_shown = visible;
        }

        egui::TopBottomPanel::top("chooser_menu").show(ctx, |ui| {
            menu::menu_bar(ui, model, commands);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Open Files and Folders");
            ui.horizontal(|ui| {
                if ui.button("Open File...").clicked() {
                    if let Some(path) = menu::pick_file() {
                        commands.push(Command::OpenFile(path));
                    }
                }
                if ui.button("Open Folder...").clicked() {
                    if let Some(path) = menu::pick_folder() {
                        commands.push(Command::OpenFolder(path));
                    }
                }
            });
            ui.separator();
            ui.label("Recent");
            egui::ScrollArea::vertical().show(ui, |ui| {
                menu::recent_entries(ui, model, commands);
            });
        });

        if ctx.input(|i| i.viewport().close_requested()) {
            if model.windows.is_empty() {
                info!("Chooser closed with no open windows, exiting");
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.session.hide_chooser();
            }
        }
    }
}

impl eframe::App for ShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.session.preferences().use_dark_style() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        let model = MenuModel::from_session(&self.session);
        let mut commands = Vec::new();

        // Every window carries the banner, the chooser may be minimized
        let error = self.last_error.clone();
        let mut dismissed = match error.as_deref() {
            Some(message) => menu::error_banner(ctx, message),
            None => false,
        };
        self.show_chooser(ctx, &model, &mut commands);
        menu::about_window(ctx);
        for (id, window) in self.session.windows_mut() {
            dismissed |= window.show(ctx, id, &model, error.as_deref(), &mut commands);
        }
        if dismissed {
            self.last_error = None;
        }

        for command in commands {
            if let Err(e) = self.session.dispatch(command) {
                warn!("{}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.shutdown();
    }
}
