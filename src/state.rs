use eframe::egui;

use crate::color::ColorMap;
use crate::data::filter::{narrow_by_domain, DomainFilter, RegionFilter, Selection, YearFilter};
use crate::data::model::{GraduateRecord, OutcomeTable};
use crate::geo::RegionMap;
use crate::regression::SalaryModel;
use crate::resources::Resources;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    Overview,
    Press,
    Geography,
    Social,
    Clustering,
    Prediction,
    Exploration,
}

impl Tab {
    pub const ALL: [Tab; 8] = [
        Tab::Home,
        Tab::Overview,
        Tab::Press,
        Tab::Geography,
        Tab::Social,
        Tab::Clustering,
        Tab::Prediction,
        Tab::Exploration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Home => "🏠 Accueil",
            Tab::Overview => "📊 Vue d'Ensemble",
            Tab::Press => "📰 Analyse de Presse",
            Tab::Geography => "🗺 Géographie",
            Tab::Social => "👥 Analyse Sociale",
            Tab::Clustering => "✨ Clustering",
            Tab::Prediction => "🧠 Prédiction",
            Tab::Exploration => "🗃 Exploration",
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionForm {
    pub region: String,
    pub domain: String,
    /// Last estimate, set when the button is pressed.
    pub estimate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Cached map textures
// ---------------------------------------------------------------------------

/// What a rasterized map was drawn from; a changed key triggers a redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum MapKey {
    Attractiveness {
        generation: u64,
        selection: Selection,
        domain: DomainFilter,
    },
    Clusters {
        generation: u64,
    },
}

pub struct CachedMap {
    pub key: MapKey,
    pub texture: egui::TextureHandle,
    pub size: [u32; 2],
}

#[derive(Default)]
pub struct MapCache {
    pub attractiveness: Option<CachedMap>,
    pub clusters: Option<CachedMap>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub table: OutcomeTable,
    pub model: SalaryModel,
    pub regions: RegionMap,

    /// Sidebar filters.
    pub selection: Selection,

    /// Indices of rows passing the sidebar filters (cached).
    pub visible_indices: Vec<usize>,

    pub tab: Tab,

    /// Extra domain refinement on the geography tab.
    pub geo_domain: DomainFilter,

    pub prediction: PredictionForm,

    /// Stable colour per grand domaine.
    pub domain_colors: ColorMap,

    pub maps: MapCache,

    /// Bumped whenever a new table is installed.
    pub generation: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(resources: Resources) -> Self {
        let Resources { table, model, regions, .. } = resources;
        let mut state = Self {
            table: OutcomeTable::default(),
            model,
            regions,
            selection: Selection::default(),
            visible_indices: Vec::new(),
            tab: Tab::default(),
            geo_domain: DomainFilter::All,
            prediction: PredictionForm::default(),
            domain_colors: ColorMap::new::<String>(&[]),
            maps: MapCache::default(),
            generation: 0,
            status_message: None,
        };
        state.set_dataset(table);
        state
    }

    /// Ingest a newly loaded table and reset every selection.
    pub fn set_dataset(&mut self, table: OutcomeTable) {
        self.selection = Selection::default();
        self.geo_domain = DomainFilter::All;
        self.domain_colors = ColorMap::new(&table.domains);
        self.prediction = PredictionForm {
            region: table.regions.first().cloned().unwrap_or_default(),
            domain: table.domains.first().cloned().unwrap_or_default(),
            estimate: None,
        };
        self.table = table;
        self.generation += 1;
        self.maps = MapCache::default();
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = self.selection.apply(&self.table);
        if let DomainFilter::Domain(d) = &self.geo_domain {
            let still_present = self.visible_rows().iter().any(|r| r.domain == *d);
            if !still_present {
                self.geo_domain = DomainFilter::All;
            }
        }
    }

    pub fn set_year(&mut self, year: YearFilter) {
        if self.selection.year != year {
            self.selection.year = year;
            self.refilter();
        }
    }

    pub fn set_region(&mut self, region: RegionFilter) {
        if self.selection.region != region {
            self.selection.region = region;
            self.refilter();
        }
    }

    /// Rows passing the sidebar filters.
    pub fn visible_rows(&self) -> Vec<&GraduateRecord> {
        self.table.rows(&self.visible_indices)
    }

    /// Rows of the geography view: sidebar filters then the domain.
    pub fn geo_rows(&self) -> Vec<&GraduateRecord> {
        let indices = narrow_by_domain(&self.table, &self.visible_indices, &self.geo_domain);
        self.table.rows(&indices)
    }

    /// Run the model on the form inputs.
    pub fn estimate_salary(&mut self) -> f64 {
        let estimate = self.model.predict(&self.prediction.domain, &self.prediction.region);
        log::debug!(
            "Estimated {estimate:.0} € for ({}, {})",
            self.prediction.domain,
            self.prediction.region
        );
        self.prediction.estimate = Some(estimate);
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ClusterCode;
    use crate::regression::LinearModel;

    fn rec(year: i32, region: &str, domain: &str) -> GraduateRecord {
        GraduateRecord {
            year,
            region: region.into(),
            domain: domain.into(),
            discipline: None,
            salary_median: Some(2000.0),
            employment_rate: None,
            stable_employment_rate: None,
            attractiveness: None,
            job_quality: None,
            parity: None,
            cluster: ClusterCode::C1,
        }
    }

    fn state() -> AppState {
        let table = OutcomeTable::from_records(vec![
            rec(2020, "Bretagne", "Droit"),
            rec(2021, "Bretagne", "Sciences"),
            rec(2021, "Occitanie", "Droit"),
        ]);
        let mut model = LinearModel { intercept: 1500.0, ..Default::default() };
        model.domain_coefficients.insert("Droit".into(), 100.0);
        let resources = Resources {
            table,
            model: SalaryModel::Linear(model),
            wordclouds: [egui::ColorImage::example(), egui::ColorImage::example()],
            regions: RegionMap::default(),
        };
        AppState::new(resources)
    }

    #[test]
    fn starts_unfiltered_with_form_defaults() {
        let s = state();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
        assert_eq!(s.prediction.region, "Bretagne");
        assert_eq!(s.prediction.domain, "Droit");
        assert_eq!(s.generation, 1);
    }

    #[test]
    fn filters_narrow_visible_rows() {
        let mut s = state();
        s.set_year(YearFilter::Year(2021));
        assert_eq!(s.visible_indices, vec![1, 2]);
        s.set_region(RegionFilter::Region("Occitanie".into()));
        assert_eq!(s.visible_indices, vec![2]);
    }

    #[test]
    fn geo_domain_resets_when_filtered_away() {
        let mut s = state();
        s.geo_domain = DomainFilter::Domain("Sciences".into());
        assert_eq!(s.geo_rows().len(), 1);
        s.set_year(YearFilter::Year(2020));
        assert_eq!(s.geo_domain, DomainFilter::All);
        assert_eq!(s.geo_rows().len(), 1);
    }

    #[test]
    fn estimate_is_stored() {
        let mut s = state();
        assert_eq!(s.estimate_salary(), 1600.0);
        assert_eq!(s.prediction.estimate, Some(1600.0));
    }
}
