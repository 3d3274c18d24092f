//! Chart building blocks shared by the views.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Sense, Stroke, Ui, Vec2};
use egui_plot::GridMark;
use image::RgbaImage;

use crate::choropleth::{self, Viewport};
use crate::color::{viridis, ValueRange};
use crate::geo::RegionMap;
use crate::state::{CachedMap, MapKey};

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Axis formatter printing `labels[i]` at integer positions and nothing elsewhere.
pub fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let v = mark.value;
        if v < -0.5 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

pub fn percent_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    format!("{:.0}%", mark.value * 100.0)
}

/// Short "how to read" box above a chart.
pub fn info(ui: &mut Ui, text: &str) {
    egui::Frame::group(ui.style())
        .fill(ui.visuals().faint_bg_color)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(format!("ℹ {text}")).italics());
        });
}

/// Colour swatch + label legend.
pub fn legend(ui: &mut Ui, entries: &[(String, Color32)]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in entries {
            ui.label(RichText::new("■").color(*color));
            ui.label(label);
            ui.add_space(8.0);
        }
    });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Pie of `(label, value, colour)` slices, starting at 12 o'clock and
/// running clockwise, with a legend of shares on the right.
pub fn pie_chart(ui: &mut Ui, slices: &[(String, f64, Color32)], diameter: f32) {
    let total: f64 = slices.iter().map(|s| s.1).filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        ui.label("Aucune donnée.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(Vec2::splat(diameter), Sense::hover());
        let center = response.rect.center();
        let radius = diameter / 2.0 - 4.0;
        let point = |angle: f32| center + radius * Vec2::angled(angle);

        let mut start = -FRAC_PI_2;
        let mut spans = Vec::with_capacity(slices.len());
        for (_, value, color) in slices {
            let sweep = (value.max(0.0) / total) as f32 * TAU;
            // Thin wedges are convex, so each can be painted as a triangle.
            let steps = ((sweep / 0.05).ceil() as usize).max(1);
            for k in 0..steps {
                let a0 = start + sweep * k as f32 / steps as f32;
                let a1 = start + sweep * (k + 1) as f32 / steps as f32;
                painter.add(egui::Shape::convex_polygon(
                    vec![center, point(a0), point(a1)],
                    *color,
                    Stroke::NONE,
                ));
            }
            spans.push((start, start + sweep));
            start += sweep;
        }
        painter.circle_stroke(center, radius, Stroke::new(1.0, ui.visuals().window_stroke.color));

        if let Some(pos) = response.hover_pos() {
            let d = pos - center;
            if d.length() <= radius {
                let angle = (d.y.atan2(d.x) + FRAC_PI_2).rem_euclid(TAU) - FRAC_PI_2;
                if let Some(i) = spans.iter().position(|(a, b)| angle >= *a && angle < *b) {
                    let (label, value, _) = &slices[i];
                    response.on_hover_text(format!("{label}: {value:.0} ({:.1}%)", value / total * 100.0));
                }
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, value, color) in slices {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(*color));
                    ui.label(format!("{label}  {:.1}%", value / total * 100.0));
                });
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Choropleth maps
// ---------------------------------------------------------------------------

/// Return the cached map for `key`, rasterizing and uploading it first when
/// the inputs changed.
pub fn cached_map<'a, F>(
    ctx: &egui::Context,
    slot: &'a mut Option<CachedMap>,
    key: MapKey,
    name: &str,
    draw: F,
) -> &'a CachedMap
where
    F: FnOnce() -> RgbaImage,
{
    if !matches!(slot, Some(cached) if cached.key == key) {
        *slot = None;
    }
    slot.get_or_insert_with(|| {
        let img = draw();
        let size = [img.width(), img.height()];
        log::debug!("Rasterized {name} map ({}x{})", size[0], size[1]);
        let texture = ctx.load_texture(name, choropleth::to_color_image(&img), egui::TextureOptions::LINEAR);
        CachedMap { key, texture, size }
    })
}

/// Show a rasterized map scaled to `width`; hovering a region shows
/// `describe(region_name)`.
pub fn map_view<D>(ui: &mut Ui, cached: &CachedMap, regions: &RegionMap, view: &Viewport, width: f32, describe: D)
where
    D: Fn(&str) -> String,
{
    let scale = width / cached.size[0] as f32;
    let display = egui::vec2(cached.size[0] as f32, cached.size[1] as f32) * scale;
    let sized = egui::load::SizedTexture::new(cached.texture.id(), display);
    let response = ui.add(egui::Image::from_texture(sized).sense(Sense::hover()));

    if let Some(pos) = response.hover_pos() {
        let local = (pos - response.rect.min) / scale;
        if let Some(region) = choropleth::hit_test(regions, view, cached.size, local.x as f64, local.y as f64) {
            response.on_hover_text(describe(&region.name));
        }
    }
}

/// Vertical Viridis colour bar from `range.min` (bottom) to `range.max` (top).
pub fn color_bar(ui: &mut Ui, range: ValueRange, title: &str, height: f32) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(title).small());
        ui.label(RichText::new(format!("{:.2}", range.max)).small());
        let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, height), Sense::hover());
        let painter = ui.painter_at(rect);
        let strips = 48;
        for i in 0..strips {
            let t0 = i as f32 / strips as f32;
            let t1 = (i + 1) as f32 / strips as f32;
            let strip = egui::Rect::from_min_max(
                egui::pos2(rect.left(), rect.bottom() - t1 * rect.height()),
                egui::pos2(rect.right(), rect.bottom() - t0 * rect.height()),
            );
            painter.rect_filled(strip, 0.0, viridis(t0 as f64));
        }
        ui.label(RichText::new(format!("{:.2}", range.min)).small());
    });
}
