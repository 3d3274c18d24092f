use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::hex;
use crate::data::aggregate::{domain_counts, overview, year_counts};
use crate::state::AppState;
use crate::ui::{charts, exploration};

/// Dataset presentation. Always computed on the whole table.
pub fn show(ui: &mut Ui, state: &AppState) {
    let rows = state.table.all_rows();
    let ov = overview(&rows);

    ui.heading("Présentation du Jeu de Données");
    match (ov.first_year, ov.last_year) {
        (Some(first), Some(last)) => ui.label(format!(
            "Les données couvrent {} années (de {first} à {last}), et concernent {} observations après nettoyage.",
            ov.n_years, ov.n_rows
        )),
        _ => ui.label("Le jeu de données est vide."),
    };
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        cols[0].label(RichText::new("Distribution par Année").strong());
        let bars: Vec<Bar> = year_counts(&rows)
            .into_iter()
            .map(|(year, n)| Bar::new(year as f64, n as f64).name(year.to_string()).width(0.8))
            .collect();
        Plot::new("year_distribution")
            .height(300.0)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Observations")
            .show(&mut cols[0], |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(hex(0x636EFA)).name("Observations"));
            });

        cols[1].label(RichText::new("Distribution par Domaine").strong());
        let slices: Vec<(String, f64, _)> = domain_counts(&rows)
            .into_iter()
            .map(|(domain, n)| {
                let color = state.domain_colors.color_for(&domain);
                (domain, n as f64, color)
            })
            .collect();
        charts::pie_chart(&mut cols[1], &slices, 260.0);
    });

    ui.add_space(8.0);
    ui.label(RichText::new("Aperçu (10 premières lignes)").strong());
    let head: Vec<_> = rows.iter().copied().take(10).collect();
    exploration::record_table(ui, "overview_head", &head);
}
