use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Mode};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the navigation sidebar.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Navigation");
    ui.separator();

    ui.label("What would you like to explore?");
    egui::ComboBox::from_id_salt("app_mode")
        .width(ui.available_width())
        .selected_text(state.mode.label())
        .show_ui(ui, |ui: &mut Ui| {
            for mode in Mode::ALL {
                if ui
                    .selectable_value(&mut state.mode, mode, mode.label())
                    .changed()
                {
                    log::debug!("switched to {mode:?}");
                }
            }
        });

    ui.add_space(12.0);
    ui.separator();

    match (&state.dataset, &state.source) {
        (Some(ds), Some(path)) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ui.label(RichText::new("Dataset").strong());
            ui.label(name);
            ui.label(
                RichText::new(format!("{} rows × {} columns", ds.n_rows(), ds.n_cols())).weak(),
            );
        }
        _ => {
            ui.label("No dataset loaded.");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new("📊 ReproSight: Analytics Hub").strong());

        if let Some(ds) = &state.dataset {
            ui.separator();
            ui.label(format!("{} respondents, {} columns", ds.n_rows(), ds.n_cols()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}
