//! Startup resources, loaded once per session.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use eframe::egui::ColorImage;

use crate::config::DashboardConfig;
use crate::data::loader;
use crate::data::model::OutcomeTable;
use crate::error::ResourceError;
use crate::geo::{self, RegionMap};
use crate::regression::SalaryModel;

/// Everything the views need besides the UI state.
pub struct Resources {
    pub table: OutcomeTable,
    pub model: SalaryModel,
    pub wordclouds: [ColorImage; 2],
    pub regions: RegionMap,
}

impl Resources {
    /// Load every artifact named by `config`. The first failure aborts.
    pub fn load(config: &DashboardConfig) -> Result<Self, ResourceError> {
        let table = load_table(&config.data_path)?;
        log::info!(
            "Loaded {} rows ({} years, {} regions, {} domains) from {}",
            table.len(),
            table.years.len(),
            table.regions.len(),
            table.domains.len(),
            config.data_path.display()
        );

        let model = SalaryModel::load(&config.model_path).map_err(|cause| ResourceError::Model {
            path: config.model_path.display().to_string(),
            cause,
        })?;
        log::info!("Loaded {} salary model from {}", model.kind(), config.model_path.display());

        let [first, second] = &config.wordcloud_images;
        let wordclouds = [load_image(first)?, load_image(second)?];

        let regions = geo::fetch_regions(
            &config.geojson_source,
            &config.geojson_name_key,
            Duration::from_secs(config.http_timeout_secs),
        )
        .map_err(|cause| ResourceError::Boundaries {
            source_name: config.geojson_source.clone(),
            cause,
        })?;

        let unmatched: Vec<&str> = table
            .regions
            .iter()
            .filter(|r| regions.get(r).is_none())
            .map(String::as_str)
            .collect();
        if !unmatched.is_empty() {
            log::warn!("Regions without boundaries (not drawn on the maps): {unmatched:?}");
        }

        Ok(Resources {
            table,
            model,
            wordclouds,
            regions,
        })
    }
}

pub fn load_table(path: &Path) -> Result<OutcomeTable, ResourceError> {
    loader::load_file(path).map_err(|cause| ResourceError::Dataset {
        path: path.display().to_string(),
        cause,
    })
}

/// Decode a PNG into an egui image.
pub fn load_image(path: &Path) -> Result<ColorImage, ResourceError> {
    let decoded = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))
        .map_err(|cause| ResourceError::Image {
            path: path.display().to_string(),
            cause,
        })?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
