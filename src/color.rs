use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::{ClusterCode, JobQuality, Parity};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let [r, g, b] = [rgb.red, rgb.green, rgb.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

// ---------------------------------------------------------------------------
// Categorical mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct labels of a column (e.g. grand domaines) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels
            .iter()
            .zip(palette)
            .map(|(label, c)| (label.as_ref().to_string(), c))
            .collect();
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scale
// ---------------------------------------------------------------------------

const VIRIDIS: [(u8, u8, u8); 9] = [
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6d, 0xcd, 0x59),
    (0xfd, 0xe7, 0x25),
];

/// Viridis colour at `t` in [0, 1], interpolated in linear RGB.
pub fn viridis(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = (scaled - i as f64) as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb { Srgb::<u8>::new(r, g, b).into_format::<f32>().into_linear() };
    let mixed = stop(VIRIDIS[i]).mix(stop(VIRIDIS[i + 1]), frac);
    to_color32(Srgb::<f32>::from_linear(mixed))
}

/// Normalises values into [0, 1] for a continuous scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
            None => Some(ValueRange { min: v, max: v }),
            Some(r) => Some(ValueRange { min: r.min.min(v), max: r.max.max(v) }),
        })
    }

    /// A degenerate range maps every value to the middle of the scale.
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            0.5
        } else {
            (v - self.min) / span
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed category colours
// ---------------------------------------------------------------------------

pub fn cluster_color(code: ClusterCode) -> Color32 {
    match code {
        ClusterCode::C0 => hex(0xEF553B),
        ClusterCode::C1 => hex(0x636EFA),
        ClusterCode::C2 => hex(0x00CC96),
        ClusterCode::C3 => hex(0xAB63FA),
    }
}

pub fn quality_color(q: JobQuality) -> Color32 {
    match q {
        JobQuality::Standard => hex(0x636EFA),
        JobQuality::Elevee => hex(0x00CC96),
        JobQuality::Excellente => hex(0xFFA15A),
    }
}

pub fn parity_color(p: Parity) -> Color32 {
    match p {
        Parity::MajoriteMasculine => hex(0x636EFA),
        Parity::Mixte => hex(0xEF553B),
        Parity::MajoriteFeminine => hex(0x00CC96),
    }
}

pub const EMPLOYMENT_COLOR: Color32 = hex(0x1F77B4);
pub const STABLE_EMPLOYMENT_COLOR: Color32 = hex(0xFF7F0E);

pub const fn hex(rgb: u32) -> Color32 {
    Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}
