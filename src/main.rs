use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::NativeOptions;
use log::{error, info, warn};
use std::path::PathBuf;

use patchview::app::ShellApp;
use patchview::preferences::Preferences;
use patchview::session::Session;
use patchview::utils::CHOOSER_SIZE;
use patchview::viewport::ViewportFactory;

/// Multi-window viewer for whole-cell current-clamp recordings
#[derive(Parser, Debug)]
#[command(name = "patchview", version)]
struct Cli {
    /// Raw data file or folder to open on launch
    path: Option<String>,

    /// Sweep to select when PATH is a file
    #[arg(long)]
    sweep: Option<usize>,

    /// Spike to select when PATH is a file
    #[arg(long)]
    spike: Option<usize>,

    /// Preferences file (defaults to the user config directory)
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Log to stderr, filtered by RUST_LOG
    #[arg(long)]
    enable_logs: bool,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let logging = match init_logging(&cli) {
        Ok(enabled) => enabled,
        Err(e) => {
            eprintln!("Could not set up logging: {:?}", e);
            false
        }
    };

    if let Err(e) = run(cli) {
        if logging {
            error!("Application encountered an error: {:?}", e);
        } else {
            eprintln!("Error: {:?}", e);
        }
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<bool> {
    if let Some(log_file) = &cli.log_file {
        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} [{}] {}: {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(log::LevelFilter::Info)
            .level_for("patchview", log::LevelFilter::Debug)
            .chain(fern::log_file(log_file)?)
            .apply()?;
        return Ok(true);
    }

    if cli.enable_logs {
        // Don't override RUST_LOG if it's already set
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "patchview=info");
        }
        env_logger::init();
        return Ok(true);
    }

    Ok(false)
}

fn default_prefs_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("patchview")
        .join("preferences.yaml")
}

fn run(cli: Cli) -> Result<()> {
    let prefs_path = cli.prefs.clone().unwrap_or_else(default_prefs_path);
    let preferences = Preferences::load(prefs_path);
    info!("Using preferences file {}", preferences.file_path().display());
    let mut session = Session::new(ViewportFactory::default(), preferences);

    let mut startup_error = None;
    if let Some(path) = cli.path.as_deref() {
        info!("Opening {} from the command line", path);
        if let Err(e) = session.open_path(Some(path), cli.sweep, cli.spike) {
            warn!("{}", e);
            startup_error = Some(e.to_string());
        }
    }

    let app = ShellApp::new(session, startup_error);
    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("patchview")
            .with_inner_size(CHOOSER_SIZE),
        vsync: true,
        ..Default::default()
    };

    info!("Starting GUI...");
    if let Err(e) = eframe::run_native(
        "patchview",
        native_options,
        Box::new(|_cc| Box::new(app)),
    ) {
        error!("GUI error: {}", e);
        return Err(anyhow!("GUI error: {}", e));
    }

    info!("GUI closed");
    Ok(())
}
