use eframe::egui::{self, RichText, Ui};

use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Mining Prédictif : Modélisation par Régression");
    ui.label(RichText::new("Outil de Prédiction de Salaire").strong().size(16.0));
    ui.label(format!(
        "Ce modèle ({}) a été entraîné pour estimer le salaire médian d'un diplômé \
         en fonction de son grand domaine et de sa région.",
        state.model.kind()
    ));
    ui.add_space(8.0);

    let regions = state.table.regions.clone();
    let domains = state.table.domains.clone();

    ui.columns(2, |cols| {
        cols[0].label("Choisissez une Région");
        egui::ComboBox::from_id_salt("pred_region")
            .width(cols[0].available_width())
            .selected_text(state.prediction.region.as_str())
            .show_ui(&mut cols[0], |ui: &mut Ui| {
                for r in &regions {
                    ui.selectable_value(&mut state.prediction.region, r.clone(), r);
                }
            });

        cols[1].label("Choisissez un Grand Domaine");
        egui::ComboBox::from_id_salt("pred_domain")
            .width(cols[1].available_width())
            .selected_text(state.prediction.domain.as_str())
            .show_ui(&mut cols[1], |ui: &mut Ui| {
                for d in &domains {
                    ui.selectable_value(&mut state.prediction.domain, d.clone(), d);
                }
            });
    });

    ui.add_space(8.0);
    if ui.button("Estimer le salaire").clicked() {
        state.estimate_salary();
    }

    if let Some(estimate) = state.prediction.estimate {
        ui.add_space(8.0);
        egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
            ui.label("Salaire Médian Mensuel Estimé");
            ui.label(RichText::new(format_salary(estimate)).size(32.0).strong());
        });
    }
}

/// Whole euros, truncated like an integer cast.
pub fn format_salary(value: f64) -> String {
    if value.is_finite() {
        format!("{} €", value.trunc() as i64)
    } else {
        "— €".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_is_truncated() {
        assert_eq!(format_salary(1999.9), "1999 €");
        assert_eq!(format_salary(2100.0), "2100 €");
        assert_eq!(format_salary(f64::NAN), "— €");
    }
}
