use std::collections::BTreeMap;

use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::choropleth::{self, Viewport};
use crate::color::{cluster_color, EMPLOYMENT_COLOR, STABLE_EMPLOYMENT_COLOR};
use crate::data::aggregate::{cluster_profiles, dominant_cluster_by_region};
use crate::data::model::{ClusterCode, Metric};
use crate::state::{AppState, MapKey};
use crate::ui::charts;

const MAP_PIXEL_WIDTH: u32 = 900;

/// K-Means segmentation. Uses the whole table, not the sidebar filters.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Mining Descriptif : Segmentation par Clustering K-Means");
    ui.label("Nous avons utilisé K-Means pour regrouper les académies en 4 profils distincts sur la base de leurs performances globales.");
    ui.add_space(8.0);

    let rows = state.table.all_rows();
    let dominant: BTreeMap<String, ClusterCode> = dominant_cluster_by_region(&rows).into_iter().collect();
    let profiles = cluster_profiles(&rows);

    // ---- 1. Map ----
    ui.label(RichText::new("1. La Géographie des Clusters").strong().size(16.0));
    charts::info(
        ui,
        "Cette carte colore chaque région selon le profil dominant de ses académies. \
         Elle révèle des ensembles géographiques cohérents.",
    );

    let view = Viewport::metropolitan();
    let ctx = ui.ctx().clone();
    let regions = &state.regions;
    let cached = charts::cached_map(
        &ctx,
        &mut state.maps.clusters,
        MapKey::Clusters { generation: state.generation },
        "clusters",
        || choropleth::rasterize(regions, &view, MAP_PIXEL_WIDTH, |name| dominant.get(name).map(|c| cluster_color(*c))),
    );
    let width = (ui.available_width() * 0.7).min(700.0);
    charts::map_view(ui, cached, regions, &view, width, |name| match dominant.get(name) {
        Some(code) => format!("{name}\nProfil : {code}"),
        None => format!("{name}\nAucune donnée"),
    });
    let entries: Vec<(String, egui::Color32)> = ClusterCode::ALL
        .iter()
        .map(|c| (c.name().to_string(), cluster_color(*c)))
        .collect();
    charts::legend(ui, &entries);

    egui::CollapsingHeader::new("Cliquez ici pour comprendre la signification de chaque profil").show(ui, |ui: &mut Ui| {
        for code in ClusterCode::ALL {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                ui.label(RichText::new(format!("{} :", code.name())).strong().color(cluster_color(code)));
                ui.label(code.description());
            });
        }
    });

    ui.separator();

    // ---- 2. Profile bars ----
    ui.label(RichText::new("2. L'ADN de chaque Cluster").strong().size(16.0));
    charts::info(
        ui,
        "Pour une lecture claire, les métriques sont présentées sur deux graphiques avec des échelles adaptées.",
    );

    let labels: Vec<String> = profiles.iter().map(|p| p.cluster.name().to_string()).collect();

    ui.columns(2, |cols| {
        cols[0].label(RichText::new("Comparaison des Salaires Médians").strong());
        let salary_bars: Vec<BarChart> = profiles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let v = p.mean(Metric::Salary)?;
                let bar = Bar::new(i as f64, v).name(p.cluster.name()).width(0.7);
                Some(BarChart::new(vec![bar]).color(cluster_color(p.cluster)))
            })
            .collect();
        Plot::new("cluster_salaries")
            .height(320.0)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(charts::category_formatter(labels.clone()))
            .y_axis_label("Salaire Médian Moyen (€)")
            .show(&mut cols[0], |plot_ui| {
                for chart in salary_bars {
                    plot_ui.bar_chart(chart);
                }
            });

        cols[1].label(RichText::new("Comparaison des Taux d'Insertion et de Stabilité").strong());
        let grouped = |offset: f64, metric: Metric| -> BarChart {
            let bars: Vec<Bar> = profiles
                .iter()
                .enumerate()
                .filter_map(|(i, p)| Some(Bar::new(i as f64 + offset, p.mean(metric)?).name(p.cluster.name()).width(0.35)))
                .collect();
            BarChart::new(bars).name(metric.label())
        };
        let employment = grouped(-0.18, Metric::EmploymentRate).color(EMPLOYMENT_COLOR);
        let stable = grouped(0.18, Metric::StableEmploymentRate).color(STABLE_EMPLOYMENT_COLOR);
        Plot::new("cluster_rates")
            .height(320.0)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(100.0)
            .x_axis_formatter(charts::category_formatter(labels))
            .y_axis_label("Taux Moyen (%)")
            .show(&mut cols[1], |plot_ui| {
                plot_ui.bar_chart(employment);
                plot_ui.bar_chart(stable);
            });
    });
}
