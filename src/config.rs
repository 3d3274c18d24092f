//! Dashboard configuration.
//!
//! Looked up from `$INSERTION_DASHBOARD_CONFIG`, then `dashboard.toml` in the
//! working directory; built-in defaults name the artifacts exported by the
//! data-management notebook.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_ENV_VAR: &str = "INSERTION_DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DashboardConfig {
    /// Outcome table (.csv, .json or .parquet).
    pub data_path: PathBuf,
    /// Salary model exported as JSON.
    pub model_path: PathBuf,
    /// The two press word clouds, in display order.
    pub wordcloud_images: [PathBuf; 2],
    /// GeoJSON of region boundaries: an http(s) URL or a local path.
    pub geojson_source: String,
    /// Feature property holding the region name.
    pub geojson_name_key: String,
    pub http_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("insertion_pro_master_final_v2.csv"),
            model_path: PathBuf::from("salary_predictor_model.json"),
            wordcloud_images: [PathBuf::from("wordcloud_article1.png"), PathBuf::from("wordcloud_article2.png")],
            geojson_source: "https://france-geojson.gregoiredavid.fr/repo/regions.geojson".to_string(),
            geojson_name_key: "nom".to_string(),
            http_timeout_secs: 20,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file. Relative artifact paths are
    /// resolved against the file's directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let mut config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.data_path = dir.join(&config.data_path);
            config.model_path = dir.join(&config.model_path);
            for image in &mut config.wordcloud_images {
                *image = dir.join(&*image);
            }
            if !is_url(&config.geojson_source) {
                config.geojson_source = dir.join(&config.geojson_source).to_string_lossy().into_owned();
            }
        }
        Ok(config)
    }

    /// Resolve the configuration for this process.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            log::info!("Using config from ${CONFIG_ENV_VAR}: {path}");
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            log::info!("Using config {}", local.display());
            return Self::load(local);
        }
        log::info!("No {DEFAULT_CONFIG_FILE} found, using defaults");
        Ok(Self::default())
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
