use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::GraduateRecord;
use crate::state::AppState;

const HEADERS: [&str; 11] = [
    "annee_diplome",
    "region",
    "grand_domaine",
    "discipline",
    "salaire_median",
    "taux_insertion",
    "taux_emploi_stable",
    "indice_attractivite",
    "qualite_emploi",
    "parite",
    "cluster",
];

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.heading("Exploration des Données Finales");
    ui.label(format!("{} lignes", state.visible_indices.len()));
    ui.separator();
    record_table(ui, "exploration_table", &state.visible_rows());
}

fn cells(r: &GraduateRecord) -> [String; 11] {
    let num = |v: Option<f64>, digits: usize| v.map(|x| format!("{x:.digits$}")).unwrap_or_default();
    [
        r.year.to_string(),
        r.region.clone(),
        r.domain.clone(),
        r.discipline.clone().unwrap_or_default(),
        num(r.salary_median, 0),
        num(r.employment_rate, 1),
        num(r.stable_employment_rate, 1),
        num(r.attractiveness, 3),
        r.job_quality.map(|q| q.to_string()).unwrap_or_default(),
        r.parity.map(|p| p.to_string()).unwrap_or_default(),
        r.cluster.code().to_string(),
    ]
}

/// Striped, virtualised table of records.
pub fn record_table(ui: &mut Ui, id: &str, rows: &[&GraduateRecord]) {
    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(Column::auto().at_least(60.0), HEADERS.len())
                .header(row_height, |mut header| {
                    for h in HEADERS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(h);
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, rows.len(), |mut row| {
                        let values = cells(rows[row.index()]);
                        for cell in values {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}
