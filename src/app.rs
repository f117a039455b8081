use eframe::egui;

use crate::state::{AppState, Mode};
use crate::ui::{explorer, insights, landing, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ReproSightApp {
    pub state: AppState,
}

impl ReproSightApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ReproSightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.mode {
            Mode::Landing => {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, landing::show);
            }
            Mode::KeyInsights => insights::show(ui, &mut self.state),
            Mode::ExploreDataset => explorer::show(ui, &mut self.state),
        });
    }
}
