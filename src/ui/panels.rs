use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::{RegionFilter, YearFilter};
use crate::resources;
use crate::state::{AppState, Tab};

pub const PAGE_TITLE: &str = "Projet de Data Mining : Analyse de l'Insertion des Masters";
pub const SIDEBAR_TITLE: &str = "🚀 Centre de Contrôle";
pub const SIDEBAR_HINT: &str = "Filtrez l'analyse pour explorer les données.";
pub const YEAR_LABEL: &str = "Année du diplôme";
pub const REGION_LABEL: &str = "Région";

// ---------------------------------------------------------------------------
// Left side panel – global filters
// ---------------------------------------------------------------------------

/// Render the sidebar: year and region filters shared by the filtered views.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(SIDEBAR_TITLE);
    ui.label(SIDEBAR_HINT);
    ui.separator();

    // Years newest first, regions alphabetical.
    let years: Vec<i32> = state.table.years.iter().rev().copied().collect();
    let regions = state.table.regions.clone();

    ui.strong(YEAR_LABEL);
    let mut year = state.selection.year;
    egui::ComboBox::from_id_salt("year_filter")
        .width(ui.available_width())
        .selected_text(year.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut year, YearFilter::All, YearFilter::All.to_string());
            for y in years {
                ui.selectable_value(&mut year, YearFilter::Year(y), y.to_string());
            }
        });
    state.set_year(year);

    ui.add_space(6.0);
    ui.strong(REGION_LABEL);
    let mut region = state.selection.region.clone();
    egui::ComboBox::from_id_salt("region_filter")
        .width(ui.available_width())
        .selected_text(region.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut region, RegionFilter::All, RegionFilter::All.to_string());
            for r in &regions {
                ui.selectable_value(&mut region, RegionFilter::Region(r.clone()), r);
            }
        });
    state.set_region(region);

    ui.separator();
    ui.label(format!(
        "{} lignes sur {} correspondent aux filtres.",
        state.visible_indices.len(),
        state.table.len()
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Fichier", |ui: &mut Ui| {
            if ui.button("Ouvrir un jeu de données…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(PAGE_TITLE).strong());
        ui.separator();
        ui.label(format!("{} lignes chargées", state.table.len()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// One selectable label per view.
pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}

/// Shown in place of the dashboard when a startup resource is missing.
pub fn failure_panel(ui: &mut Ui, message: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading(PAGE_TITLE);
        ui.add_space(20.0);
    });
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(0x4a, 0x14, 0x14))
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(message).color(Color32::from_rgb(0xff, 0xb4, 0xb4)));
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Replace the outcome table. A failure leaves the current table in place.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Ouvrir un jeu de données")
        .add_filter("Formats pris en charge", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match resources::load_table(&path) {
            Ok(table) => {
                log::info!("Loaded {} rows from {}", table.len(), path.display());
                state.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Erreur : {e}"));
            }
        }
    }
}
