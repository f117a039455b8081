mod app;
mod color;
mod config;
mod data;
mod state;
mod stats;
mod ui;

use app::ReproSightApp;
use clap::Parser;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    let config = Config::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.default_log_filter()),
    )
    .init();

    let mut state = AppState::new(config.mode);
    if config.data.exists() {
        state.load(&config.data);
    } else {
        log::warn!("dataset {} not found", config.data.display());
        state.status_message = Some(format!(
            "Dataset not found: {} (File → Open…)",
            config.data.display()
        ));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ReproSight: Analytics Hub",
        options,
        Box::new(|_cc| Ok(Box::new(ReproSightApp::new(state)))),
    )
}
