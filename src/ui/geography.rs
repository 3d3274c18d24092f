use std::collections::BTreeMap;

use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::choropleth::{self, Viewport};
use crate::color::{viridis, ValueRange};
use crate::data::aggregate::{mean_by_region, overseas_means};
use crate::data::filter::{domains_in, DomainFilter};
use crate::data::model::Metric;
use crate::state::{AppState, MapKey};
use crate::ui::charts;

const MAP_PIXEL_WIDTH: u32 = 900;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading(format!(
        "Analyse Géographique ({}, {})",
        state.selection.region, state.selection.year
    ));

    // ---- Domain refinement ----
    let domains = domains_in(&state.table, &state.visible_indices);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Affiner par Grand Domaine :");
        egui::ComboBox::from_id_salt("geo_domain")
            .selected_text(state.geo_domain.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                ui.selectable_value(&mut state.geo_domain, DomainFilter::All, DomainFilter::All.to_string());
                for d in &domains {
                    ui.selectable_value(&mut state.geo_domain, DomainFilter::Domain(d.clone()), d);
                }
            });
    });

    let map_rows = state.geo_rows();
    let means: BTreeMap<String, f64> = mean_by_region(&map_rows, Metric::Attractiveness).into_iter().collect();
    let range = ValueRange::of(means.values().copied());
    let overseas = overseas_means(&state.visible_rows());

    ui.label(RichText::new(format!("Carte de l'Indice d'Attractivité ({})", state.geo_domain)).strong().size(16.0));

    let view = Viewport::metropolitan();
    let key = MapKey::Attractiveness {
        generation: state.generation,
        selection: state.selection.clone(),
        domain: state.geo_domain.clone(),
    };
    let ctx = ui.ctx().clone();
    let regions = &state.regions;
    let cached = charts::cached_map(&ctx, &mut state.maps.attractiveness, key, "attractiveness", || {
        choropleth::rasterize(regions, &view, MAP_PIXEL_WIDTH, |name| {
            let r = range?;
            means.get(name).map(|v| viridis(r.normalize(*v)))
        })
    });

    let total = ui.available_width();
    ui.horizontal_top(|ui: &mut Ui| {
        // ---- Metropolitan map ----
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new("France Métropolitaine").strong());
            charts::map_view(ui, cached, regions, &view, total * 0.62, |name| match means.get(name) {
                Some(v) => format!("{name}\nIndice : {v:.3}"),
                None => format!("{name}\nAucune donnée"),
            });
        });
        if let Some(r) = range {
            charts::color_bar(ui, r, Metric::Attractiveness.label(), 240.0);
        }

        // ---- Overseas bars ----
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new("Outre-mer").strong());
            if overseas.is_empty() {
                ui.label("Aucune donnée pour l'outre-mer avec ces filtres.");
                return;
            }
            let bar_range = ValueRange::of(overseas.iter().map(|(_, v)| *v));
            let labels: Vec<String> = overseas.iter().map(|(r, _)| r.clone()).collect();
            let bars: Vec<Bar> = overseas
                .iter()
                .enumerate()
                .map(|(i, (region, v))| {
                    let t = bar_range.map_or(0.5, |r| r.normalize(*v));
                    Bar::new(i as f64, *v).name(region).fill(viridis(t)).width(0.7)
                })
                .collect();
            Plot::new("overseas_bars")
                .width(ui.available_width().max(200.0))
                .height(420.0)
                .allow_drag(false)
                .allow_scroll(false)
                .y_axis_formatter(charts::category_formatter(labels))
                .x_axis_label("Indice")
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).horizontal());
                });
        });
    });
}
