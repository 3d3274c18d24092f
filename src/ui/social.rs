use eframe::egui::{RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::color::{parity_color, quality_color};
use crate::data::aggregate::{domain_positions, quality_shares, salary_boxes, SalaryBox};
use crate::data::model::{GraduateRecord, JobQuality, Metric, Parity};
use crate::state::AppState;
use crate::ui::charts;

/// Largest bubble radius, in points.
const MAX_BUBBLE_RADIUS: f32 = 30.0;

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.heading(format!(
        "Analyses Sectorielles et Sociales ({}, {})",
        state.selection.region, state.selection.year
    ));
    let rows = state.visible_rows();

    bubble_chart(ui, state, &rows);
    ui.separator();
    quality_chart(ui, &rows);
    ui.separator();
    parity_chart(ui, &rows);
}

// ---------------------------------------------------------------------------
// Strategic positioning (bubbles)
// ---------------------------------------------------------------------------

fn bubble_chart(ui: &mut Ui, state: &AppState, rows: &[&GraduateRecord]) {
    ui.label(RichText::new("Positionnement Stratégique des Grands Domaines").strong().size(16.0));
    charts::info(
        ui,
        "Comment lire ce graphique ? Chaque bulle est un domaine. L'idéal est en haut à droite \
         (haut salaire, haute insertion).",
    );

    let positions = domain_positions(rows);
    let max_count = positions.iter().map(|p| p.count).max().unwrap_or(0).max(1);

    Plot::new("domain_bubbles")
        .height(380.0)
        .legend(Legend::default())
        .x_axis_label(Metric::EmploymentRate.label())
        .y_axis_label(Metric::Salary.label())
        .show(ui, |plot_ui| {
            for p in &positions {
                let (Some(x), Some(y)) = (p.mean_employment, p.mean_salary) else {
                    continue;
                };
                // Area proportional to the count.
                let radius = MAX_BUBBLE_RADIUS * (p.count as f32 / max_count as f32).sqrt();
                let color = state.domain_colors.color_for(&p.domain);
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[x, y]]))
                        .radius(radius.max(3.0))
                        .color(color.gamma_multiply(0.8))
                        .name(format!("{} ({})", p.domain, p.count)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Job quality (stacked 100% bars)
// ---------------------------------------------------------------------------

fn quality_chart(ui: &mut Ui, rows: &[&GraduateRecord]) {
    ui.label(RichText::new("Analyse de la Qualité de l'Emploi par Domaine").strong().size(16.0));
    charts::info(
        ui,
        "Comment lire ce graphique ? Chaque barre représente 100% d'un domaine. On y voit la part des \
         emplois de qualité 'Standard', 'Élevée' ou 'Excellente'.",
    );

    let shares = quality_shares(rows);
    let labels: Vec<String> = shares.iter().map(|s| s.domain.clone()).collect();

    let mut charts_by_level: Vec<BarChart> = Vec::with_capacity(JobQuality::ALL.len());
    for level in JobQuality::ALL {
        let bars: Vec<Bar> = shares
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Bar::new(i as f64, s.shares[level.index()])
                    .name(format!("{} – {}", s.domain, level))
                    .width(0.7)
            })
            .collect();
        let below: Vec<&BarChart> = charts_by_level.iter().collect();
        let chart = BarChart::new(bars)
            .name(level.label())
            .color(quality_color(level))
            .stack_on(&below);
        charts_by_level.push(chart);
    }

    Plot::new("quality_shares")
        .height(340.0)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .include_y(0.0)
        .include_y(1.0)
        .x_axis_formatter(charts::category_formatter(labels))
        .y_axis_formatter(charts::percent_formatter)
        .y_axis_label("Répartition en %")
        .show(ui, |plot_ui| {
            for chart in charts_by_level {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Salaries by parity (box plots)
// ---------------------------------------------------------------------------

fn parity_chart(ui: &mut Ui, rows: &[&GraduateRecord]) {
    ui.label(RichText::new("Salaires et Parité par Domaine").strong().size(16.0));
    charts::info(
        ui,
        "Comment lire ce graphique ? Chaque boîte montre la distribution des salaires pour une catégorie. \
         Cela permet de voir si, au sein d'un même domaine, les filières majoritairement féminines, mixtes \
         ou masculines ont des perspectives salariales différentes.",
    );

    let boxes = salary_boxes(rows);
    if boxes.is_empty() {
        ui.label("Aucune donnée de parité avec ces filtres.");
        return;
    }

    let layout = parity_layout(&boxes);
    let box_width = GROUP_WIDTH / Parity::ALL.len() as f64;

    let mut plots: Vec<BoxPlot> = Vec::with_capacity(layout.series.len());
    let mut outliers: Vec<Points> = Vec::with_capacity(layout.series.len());
    for series in &layout.series {
        let color = parity_color(series.parity);
        let elems: Vec<BoxElem> = series
            .boxes
            .iter()
            .map(|(x, b)| {
                let s = &b.stats;
                BoxElem::new(*x, BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker))
                    .name(format!("{} – {}", b.domain, series.parity))
                    .box_width(box_width * 0.9)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color))
            })
            .collect();
        plots.push(BoxPlot::new(elems).name(series.parity.label()).color(color));
        outliers.push(
            Points::new(PlotPoints::new(series.outliers.clone()))
                .name(series.parity.label())
                .color(color)
                .radius(3.0),
        );
    }

    Plot::new("salary_by_parity")
        .height(380.0)
        .legend(Legend::default())
        .x_axis_formatter(charts::category_formatter(layout.domains))
        .y_axis_label("Distribution des Salaires (€)")
        .show(ui, |plot_ui| {
            for bp in plots {
                plot_ui.box_plot(bp);
            }
            for points in outliers {
                plot_ui.points(points);
            }
        });
}

/// Share of a domain slot taken by its boxes.
const GROUP_WIDTH: f64 = 0.8;

/// Boxes of one parity category with their x positions, plus the samples
/// beyond the whiskers at the same positions.
struct ParitySeries<'a> {
    parity: Parity,
    boxes: Vec<(f64, &'a SalaryBox)>,
    outliers: Vec<[f64; 2]>,
}

struct ParityLayout<'a> {
    /// Category label per integer x.
    domains: Vec<String>,
    series: Vec<ParitySeries<'a>>,
}

/// Domains sit at integer x; parity categories share the slot side by side.
fn parity_layout(boxes: &[SalaryBox]) -> ParityLayout<'_> {
    let mut domains: Vec<String> = boxes.iter().map(|b| b.domain.clone()).collect();
    domains.dedup();
    let box_width = GROUP_WIDTH / Parity::ALL.len() as f64;

    let series = Parity::ALL
        .into_iter()
        .enumerate()
        .map(|(slot, parity)| {
            let mut placed = Vec::new();
            let mut outliers = Vec::new();
            for b in boxes.iter().filter(|b| b.parity == parity) {
                let Some(i) = domains.iter().position(|d| *d == b.domain) else {
                    continue;
                };
                let x = i as f64 - GROUP_WIDTH / 2.0 + box_width * (slot as f64 + 0.5);
                outliers.extend(b.stats.outliers.iter().map(|y| [x, *y]));
                placed.push((x, b));
            }
            ParitySeries { parity, boxes: placed, outliers }
        })
        .collect();

    ParityLayout { domains, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::BoxStats;

    fn salary_box(domain: &str, parity: Parity, values: &[f64]) -> SalaryBox {
        SalaryBox {
            domain: domain.to_string(),
            parity,
            stats: BoxStats::from_values(values).unwrap(),
        }
    }

    #[test]
    fn outliers_are_plotted_at_their_box() {
        let boxes = vec![
            salary_box("Droit", Parity::Mixte, &[1800.0, 1850.0, 1900.0, 1950.0, 2000.0, 5000.0]),
            salary_box("Droit", Parity::MajoriteFeminine, &[1700.0, 1750.0, 1800.0]),
            salary_box("Sciences", Parity::Mixte, &[100.0, 2100.0, 2150.0, 2200.0, 2250.0, 2300.0]),
        ];
        let layout = parity_layout(&boxes);
        assert_eq!(layout.domains, vec!["Droit", "Sciences"]);

        let mixte = layout.series.iter().find(|s| s.parity == Parity::Mixte).unwrap();
        assert_eq!(mixte.boxes.len(), 2);
        let droit_x = mixte.boxes[0].0;
        let sciences_x = mixte.boxes[1].0;
        assert_eq!(mixte.outliers, vec![[droit_x, 5000.0], [sciences_x, 100.0]]);
        // Mixte is the middle slot of the Droit group.
        assert!((droit_x - 0.0).abs() < 1e-9);
        assert!((sciences_x - 1.0).abs() < 1e-9);

        let feminine = layout.series.iter().find(|s| s.parity == Parity::MajoriteFeminine).unwrap();
        assert!(feminine.outliers.is_empty());
        assert!(feminine.boxes[0].0 > droit_x);
    }
}
