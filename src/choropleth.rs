//! Choropleth rasterizer: region polygons → RGBA image.
//!
//! Regions are projected with an equirectangular projection scaled by
//! cos(latitude) at the centre of the view, filled scanline by scanline with
//! the even-odd rule, then outlined.

use eframe::egui::{self, Color32};
use image::{Rgba, RgbaImage};

use crate::geo::{Region, RegionMap};

/// Fill for regions that have no value under the current filters.
pub const NO_DATA: Color32 = Color32::from_rgb(0x55, 0x55, 0x5f);
const OUTLINE: Rgba<u8> = Rgba([0xee, 0xee, 0xee, 0xff]);

/// A lon/lat window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl Viewport {
    /// Metropolitan France, centred on 46.8° N, 2.35° E.
    pub fn metropolitan() -> Self {
        Self::centered(46.8, 2.35, 5.6)
    }

    /// A window `half_lat` degrees tall either side of the centre, with a
    /// longitude span giving square pixels at that latitude.
    pub fn centered(lat: f64, lon: f64, half_lat: f64) -> Self {
        let half_lon = half_lat / lat.to_radians().cos();
        Viewport {
            lon_min: lon - half_lon,
            lon_max: lon + half_lon,
            lat_min: lat - half_lat,
            lat_max: lat + half_lat,
        }
    }

    fn aspect(&self) -> f64 {
        let mid = ((self.lat_min + self.lat_max) / 2.0).to_radians().cos();
        (self.lon_max - self.lon_min) * mid / (self.lat_max - self.lat_min)
    }

    /// Image size for a given pixel width.
    pub fn image_size(&self, width: u32) -> [u32; 2] {
        let height = (width as f64 / self.aspect()).round().max(1.0) as u32;
        [width.max(1), height]
    }

    /// Lon/lat → pixel coordinates (origin top-left).
    pub fn project(&self, lon: f64, lat: f64, size: [u32; 2]) -> (f64, f64) {
        let x = (lon - self.lon_min) / (self.lon_max - self.lon_min) * size[0] as f64;
        let y = (self.lat_max - lat) / (self.lat_max - self.lat_min) * size[1] as f64;
        (x, y)
    }

    /// Pixel coordinates → lon/lat.
    pub fn unproject(&self, x: f64, y: f64, size: [u32; 2]) -> (f64, f64) {
        let lon = self.lon_min + x / size[0] as f64 * (self.lon_max - self.lon_min);
        let lat = self.lat_max - y / size[1] as f64 * (self.lat_max - self.lat_min);
        (lon, lat)
    }
}

/// Draw every region of `map`; `fill` gives the colour for a region name,
/// `None` meaning no data.
pub fn rasterize<F>(map: &RegionMap, view: &Viewport, width: u32, fill: F) -> RgbaImage
where
    F: Fn(&str) -> Option<Color32>,
{
    let size = view.image_size(width);
    let mut img = RgbaImage::new(size[0], size[1]);

    for region in &map.regions {
        let color = fill(&region.name).unwrap_or(NO_DATA);
        let edges = pixel_edges(region, view, size);
        fill_even_odd(&mut img, &edges, Rgba([color.r(), color.g(), color.b(), 0xff]));
    }
    for region in &map.regions {
        for &((x0, y0), (x1, y1)) in &pixel_edges(region, view, size) {
            draw_line(&mut img, x0, y0, x1, y1, OUTLINE);
        }
    }
    img
}

type Edge = ((f64, f64), (f64, f64));

fn pixel_edges(region: &Region, view: &Viewport, size: [u32; 2]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for ring in region.polygons.iter().flatten() {
        let pts: Vec<(f64, f64)> = ring.iter().map(|&(lon, lat)| view.project(lon, lat, size)).collect();
        for (i, &a) in pts.iter().enumerate() {
            let b = pts[(i + 1) % pts.len()];
            if a != b {
                edges.push((a, b));
            }
        }
    }
    edges
}

/// Scanline fill sampling pixel centres.
fn fill_even_odd(img: &mut RgbaImage, edges: &[Edge], color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let mut xs: Vec<f64> = Vec::new();
    for py in 0..h {
        let y = py as f64 + 0.5;
        xs.clear();
        for &((x0, y0), (x1, y1)) in edges {
            if (y0 > y) != (y1 > y) {
                xs.push(x0 + (y - y0) / (y1 - y0) * (x1 - x0));
            }
        }
        xs.sort_by(f64::total_cmp);
        for pair in xs.chunks_exact(2) {
            let start = (pair[0] - 0.5).ceil().max(0.0);
            let end = (pair[1] - 0.5).floor().min(w as f64 - 1.0);
            if start > end {
                continue;
            }
            for px in start as u32..=end as u32 {
                img.put_pixel(px, py, color);
            }
        }
    }
}

/// DDA line, clipped to the image.
fn draw_line(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
    if steps > 4.0 * (w + h) as f64 {
        return;
    }
    for s in 0..=steps as u32 {
        let t = s as f64 / steps;
        let x = (x0 + (x1 - x0) * t).floor();
        let y = (y0 + (y1 - y0) * t).floor();
        if x >= 0.0 && y >= 0.0 && x < w as f64 && y < h as f64 {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Upload-ready copy of a rasterized map.
pub fn to_color_image(img: &RgbaImage) -> egui::ColorImage {
    let size = [img.width() as usize, img.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw())
}

/// Region under a pixel of an image produced by [`rasterize`].
pub fn hit_test<'a>(map: &'a RegionMap, view: &Viewport, size: [u32; 2], x: f64, y: f64) -> Option<&'a Region> {
    let (lon, lat) = view.unproject(x, y, size);
    map.region_at(lon, lat)
}
