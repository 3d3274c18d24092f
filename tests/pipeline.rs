//! Integration tests: files on disk through to the numbers the views plot.

use std::io::Write;
use std::path::Path;

use image::{Rgba, RgbaImage};
use tempfile::{NamedTempFile, TempDir};

use insertion_dashboard::choropleth::{self, Viewport};
use insertion_dashboard::config::DashboardConfig;
use insertion_dashboard::data::aggregate::{
    cluster_profiles, dominant_cluster_by_region, domain_counts, mean_by_region, overseas_means, overview,
    quality_shares,
};
use insertion_dashboard::data::filter::{narrow_by_domain, DomainFilter, RegionFilter, Selection, YearFilter};
use insertion_dashboard::data::loader::load_file;
use insertion_dashboard::data::model::{ClusterCode, Metric};
use insertion_dashboard::error::ResourceError;
use insertion_dashboard::geo::parse_regions;
use insertion_dashboard::regression::SalaryModel;
use insertion_dashboard::resources::Resources;

const HEADER: &str = "annee_diplome,academie,region,grand_domaine,discipline,salaire_median,taux_insertion,taux_emploi_stable,indice_attractivite,qualite_emploi,parite,cluster";

const ROWS: [&str; 8] = [
    "2020,Rennes,Bretagne,Droit,Droit privé,1900,90,70,0.52,Élevée,Mixte,3",
    "2020,Rennes,Bretagne,Sciences,Chimie,2100,93,78,0.71,Excellente,Majorité Masculine,3",
    "2021,Rennes,Bretagne,Lettres,Langues,1600,82,55,0.20,Standard,Majorité Féminine,3",
    "2020,Toulouse,Occitanie,Droit,Gestion,1850,89,66,0.48,Élevée,,1",
    "2021,Montpellier,Occitanie,Sciences,Informatique,2200,94,80,0.80,Excellente,Majorité Masculine,1",
    "2021,Montpellier,Occitanie,Lettres,Arts,1500,80,50,0.10,Standard,Mixte,0",
    "2021,La Réunion,La Réunion,Droit,Droit public,1700,84,60,0.30,Standard,Mixte,0",
    "2020,Guyane,Guyane,Sciences,Biologie,1750,85,62,0.35,Élevée,Majorité Féminine,1",
];

/// Create a test CSV file with sample outcomes
fn create_test_csv() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in ROWS {
        writeln!(file, "{row}").unwrap();
    }
    file
}

/// Two square "regions" inside the metropolitan view.
const GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "nom": "Bretagne" },
      "geometry": { "type": "Polygon", "coordinates": [[[-4,47],[-1,47],[-1,49],[-4,49],[-4,47]]] } },
    { "type": "Feature", "properties": { "nom": "Occitanie" },
      "geometry": { "type": "MultiPolygon", "coordinates": [[[[1,43],[4,43],[4,45],[1,45],[1,43]]]] } }
  ]
}"#;

const MODEL: &str = r#"{
  "kind": "random_forest",
  "encoder": { "domains": ["Droit", "Lettres", "Sciences"], "regions": ["Bretagne", "Occitanie"] },
  "trees": [
    { "nodes": [
        { "feature": 2, "threshold": 0.5, "left": 1, "right": 2 },
        { "value": 1700.0 },
        { "value": 2150.0 } ] },
    { "nodes": [
        { "feature": 4, "threshold": 0.5, "left": 1, "right": 2 },
        { "value": 1800.0 },
        { "value": 1900.0 } ] }
  ]
}"#;

fn write_png(path: &Path) {
    RgbaImage::from_pixel(8, 4, Rgba([200, 80, 40, 255])).save(path).unwrap();
}

/// A directory holding every startup artifact and a config naming them.
fn artifact_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    std::fs::write(root.join("data.csv"), format!("{HEADER}\n{}\n", ROWS.join("\n"))).unwrap();
    std::fs::write(root.join("model.json"), MODEL).unwrap();
    std::fs::write(root.join("regions.geojson"), GEOJSON).unwrap();
    write_png(&root.join("cloud1.png"));
    write_png(&root.join("cloud2.png"));
    std::fs::write(
        root.join("dashboard.toml"),
        r#"
data-path = "data.csv"
model-path = "model.json"
wordcloud-images = ["cloud1.png", "cloud2.png"]
geojson-source = "regions.geojson"
"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_csv_loads_with_sorted_choices() {
    let file = create_test_csv();
    let table = load_file(file.path()).unwrap();

    assert_eq!(table.len(), 8);
    assert_eq!(table.years, vec![2020, 2021]);
    assert_eq!(table.domains, vec!["Droit", "Lettres", "Sciences"]);
    assert_eq!(table.regions.first().map(String::as_str), Some("Bretagne"));
    // One row has no parity.
    assert_eq!(table.records.iter().filter(|r| r.parity.is_none()).count(), 1);
}

#[test]
fn test_filters_commute_and_feed_aggregations() {
    let file = create_test_csv();
    let table = load_file(file.path()).unwrap();

    let selection = Selection {
        year: YearFilter::Year(2021),
        region: RegionFilter::Region("Occitanie".into()),
    };
    let both = selection.apply(&table);
    assert_eq!(both, vec![4, 5]);

    let year_first = Selection { year: YearFilter::Year(2021), ..Default::default() }.apply(&table);
    let region_first = Selection {
        region: RegionFilter::Region("Occitanie".into()),
        ..Default::default()
    }
    .apply(&table);
    let mut intersection: Vec<usize> = year_first.iter().copied().filter(|i| region_first.contains(i)).collect();
    intersection.sort_unstable();
    assert_eq!(intersection, both);

    let rows = table.rows(&both);
    let means = mean_by_region(&rows, Metric::Salary);
    assert_eq!(means, vec![("Occitanie".to_string(), 1850.0)]);

    let sciences = narrow_by_domain(&table, &both, &DomainFilter::Domain("Sciences".into()));
    assert_eq!(sciences, vec![4]);
}

#[test]
fn test_empty_selection_yields_empty_views() {
    let file = create_test_csv();
    let table = load_file(file.path()).unwrap();

    let none = Selection { year: YearFilter::Year(1999), ..Default::default() }.apply(&table);
    let rows = table.rows(&none);
    assert!(rows.is_empty());
    assert_eq!(overview(&rows).n_rows, 0);
    assert!(domain_counts(&rows).is_empty());
    assert!(quality_shares(&rows).is_empty());
    assert!(overseas_means(&rows).is_empty());
    assert!(mean_by_region(&rows, Metric::Attractiveness).is_empty());
}

#[test]
fn test_clustering_uses_whole_table() {
    let file = create_test_csv();
    let table = load_file(file.path()).unwrap();
    let rows = table.all_rows();

    let dominant = dominant_cluster_by_region(&rows);
    let bretagne = dominant.iter().find(|(r, _)| r == "Bretagne").map(|(_, c)| *c);
    assert_eq!(bretagne, Some(ClusterCode::C3));
    // Occitanie: two C1 rows against one C0.
    let occitanie = dominant.iter().find(|(r, _)| r == "Occitanie").map(|(_, c)| *c);
    assert_eq!(occitanie, Some(ClusterCode::C1));

    let profiles = cluster_profiles(&rows);
    assert!(profiles.iter().all(|p| p.mean_salary.is_some()));
}

#[test]
fn test_model_predicts_every_pair() {
    let model = SalaryModel::from_json(MODEL).unwrap();
    let file = create_test_csv();
    let table = load_file(file.path()).unwrap();

    for domain in &table.domains {
        for region in &table.regions {
            let estimate = model.predict(domain, region);
            assert!(estimate.is_finite(), "{domain} / {region}");
        }
    }
    assert_eq!(model.predict("Sciences", "Occitanie"), (2150.0 + 1900.0) / 2.0);
    // Unknown categories encode as zeros.
    assert_eq!(model.predict("Médecine", "Corse"), (1700.0 + 1800.0) / 2.0);
}

#[test]
fn test_resources_load_from_config_dir() {
    let dir = artifact_dir();
    let config = DashboardConfig::load(&dir.path().join("dashboard.toml")).unwrap();
    let resources = Resources::load(&config).unwrap();

    assert_eq!(resources.table.len(), 8);
    assert_eq!(resources.model.kind(), "random forest");
    assert_eq!(resources.regions.len(), 2);
    assert_eq!(resources.wordclouds[0].size, [8, 4]);
}

#[test]
fn test_missing_artifact_halts_startup() {
    let dir = artifact_dir();
    std::fs::remove_file(dir.path().join("model.json")).unwrap();
    let config = DashboardConfig::load(&dir.path().join("dashboard.toml")).unwrap();

    let err = Resources::load(&config).err().unwrap();
    assert!(matches!(err, ResourceError::Model { .. }));
    assert!(err.user_message().contains("Fichier manquant"));
}

#[test]
fn test_choropleth_colors_regions_with_data() {
    let map = parse_regions(GEOJSON, "nom").unwrap();
    let view = Viewport::metropolitan();
    let width = 300;
    let img = choropleth::rasterize(&map, &view, width, |name| {
        (name == "Bretagne").then_some(eframe::egui::Color32::from_rgb(255, 0, 0))
    });
    let size = [img.width(), img.height()];

    let (x, y) = view.project(-2.5, 48.0, size);
    assert_eq!(img.get_pixel(x as u32, y as u32).0, [255, 0, 0, 255]);

    let (x, y) = view.project(2.5, 44.0, size);
    let hit = choropleth::hit_test(&map, &view, size, x, y).map(|r| r.name.as_str());
    assert_eq!(hit, Some("Occitanie"));
}
