//! Writes a synthetic outcome table, a matching linear salary model and two
//! placeholder word clouds into the current directory (or the directory
//! given as the first argument).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use image::{Rgba, RgbaImage};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use insertion_dashboard::config::DashboardConfig;
use insertion_dashboard::data::model::{ClusterCode, JobQuality, Parity};
use insertion_dashboard::regression::{LinearModel, SalaryModel};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// ---------------------------------------------------------------------------
// Synthetic geography
// ---------------------------------------------------------------------------

/// (region, academies, salary offset, cluster)
const REGIONS: [(&str, &[&str], f64, ClusterCode); 18] = [
    ("Île-de-France", &["Paris", "Créteil", "Versailles"], 320.0, ClusterCode::C2),
    ("Auvergne-Rhône-Alpes", &["Lyon", "Grenoble", "Clermont-Ferrand"], 90.0, ClusterCode::C3),
    ("Occitanie", &["Toulouse", "Montpellier"], 40.0, ClusterCode::C3),
    ("Nouvelle-Aquitaine", &["Bordeaux", "Poitiers", "Limoges"], 10.0, ClusterCode::C3),
    ("Provence-Alpes-Côte d'Azur", &["Aix-Marseille", "Nice"], 60.0, ClusterCode::C1),
    ("Grand Est", &["Strasbourg", "Nancy-Metz", "Reims"], 0.0, ClusterCode::C1),
    ("Hauts-de-France", &["Lille", "Amiens"], -20.0, ClusterCode::C1),
    ("Bretagne", &["Rennes"], 20.0, ClusterCode::C3),
    ("Pays de la Loire", &["Nantes"], 30.0, ClusterCode::C3),
    ("Normandie", &["Normandie"], -30.0, ClusterCode::C0),
    ("Bourgogne-Franche-Comté", &["Dijon", "Besançon"], -40.0, ClusterCode::C0),
    ("Centre-Val de Loire", &["Orléans-Tours"], -25.0, ClusterCode::C0),
    ("Corse", &["Corse"], -80.0, ClusterCode::C0),
    ("Guadeloupe", &["Guadeloupe"], -120.0, ClusterCode::C0),
    ("Martinique", &["Martinique"], -110.0, ClusterCode::C0),
    ("Guyane", &["Guyane"], -140.0, ClusterCode::C1),
    ("La Réunion", &["La Réunion"], -90.0, ClusterCode::C1),
    ("Mayotte", &["Mayotte"], -160.0, ClusterCode::C1),
];

/// (grand domaine, disciplines, salary offset, insertion offset)
const DOMAINS: [(&str, &[&str], f64, f64); 5] = [
    ("Droit, économie et gestion", &["Droit", "Économie", "Gestion"], 180.0, 2.0),
    ("Lettres, langues, arts", &["Lettres", "Langues", "Arts"], -220.0, -6.0),
    ("Sciences humaines et sociales", &["Psychologie", "Histoire", "Sociologie"], -150.0, -4.0),
    ("Sciences, technologies et santé", &["Informatique", "Chimie", "Mathématiques"], 260.0, 4.0),
    ("Masters enseignement", &["Enseignement"], -60.0, 5.0),
];

const YEARS: [i64; 4] = [2018, 2019, 2020, 2021];
const BASE_SALARY: f64 = 1900.0;
const BASE_INSERTION: f64 = 88.0;

#[derive(Debug, Serialize)]
struct Row {
    annee_diplome: i64,
    academie: String,
    region: String,
    grand_domaine: String,
    discipline: String,
    salaire_median: f64,
    taux_insertion: f64,
    taux_emploi_stable: f64,
    indice_attractivite: f64,
    qualite_emploi: String,
    parite: Option<String>,
    cluster: String,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &year in &YEARS {
        let trend = (year - YEARS[0]) as f64 * 25.0;
        for (region, academies, region_offset, cluster) in REGIONS {
            for academy in academies {
                for (domain, disciplines, domain_offset, insertion_offset) in DOMAINS {
                    for discipline in disciplines {
                        let salary = (BASE_SALARY + trend + region_offset + domain_offset + rng.gauss(0.0, 90.0)).round();
                        let insertion = (BASE_INSERTION + insertion_offset + rng.gauss(0.0, 3.0)).clamp(50.0, 100.0);
                        let stable = (insertion - 20.0 + rng.gauss(0.0, 6.0)).clamp(20.0, insertion);
                        // Roughly 1 row in 10 has no parity information.
                        let parite = (rng.next_f64() > 0.1).then(|| rng.pick(&Parity::ALL).label().to_string());
                        rows.push(Row {
                            annee_diplome: year,
                            academie: academy.to_string(),
                            region: region.to_string(),
                            grand_domaine: domain.to_string(),
                            discipline: discipline.to_string(),
                            salaire_median: salary,
                            taux_insertion: (insertion * 10.0).round() / 10.0,
                            taux_emploi_stable: (stable * 10.0).round() / 10.0,
                            indice_attractivite: 0.0,
                            qualite_emploi: quality_for(stable).label().to_string(),
                            parite,
                            cluster: cluster.code().to_string(),
                        });
                    }
                }
            }
        }
    }
    fill_attractiveness(&mut rows);
    rows
}

fn quality_for(stable_rate: f64) -> JobQuality {
    if stable_rate >= 75.0 {
        JobQuality::Excellente
    } else if stable_rate >= 65.0 {
        JobQuality::Elevee
    } else {
        JobQuality::Standard
    }
}

fn min_max(rows: &[Row], f: impl Fn(&Row) -> f64) -> (f64, f64) {
    rows.iter()
        .map(f)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// 60% normalized salary, 40% normalized insertion rate.
fn fill_attractiveness(rows: &mut [Row]) {
    let (s_lo, s_hi) = min_max(rows, |r| r.salaire_median);
    let (i_lo, i_hi) = min_max(rows, |r| r.taux_insertion);
    let norm = |v: f64, lo: f64, hi: f64| if hi > lo { (v - lo) / (hi - lo) } else { 0.5 };
    for r in rows.iter_mut() {
        let score = 0.6 * norm(r.salaire_median, s_lo, s_hi) + 0.4 * norm(r.taux_insertion, i_lo, i_hi);
        r.indice_attractivite = (score * 1000.0).round() / 1000.0;
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn text_column(rows: &[Row], f: impl Fn(&Row) -> &str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rows.iter().map(f)))
}

fn number_column(rows: &[Row], f: impl Fn(&Row) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(rows.iter().map(f)))
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("annee_diplome", DataType::Int64, false),
        Field::new("academie", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("grand_domaine", DataType::Utf8, false),
        Field::new("discipline", DataType::Utf8, false),
        Field::new("salaire_median", DataType::Float64, false),
        Field::new("taux_insertion", DataType::Float64, false),
        Field::new("taux_emploi_stable", DataType::Float64, false),
        Field::new("indice_attractivite", DataType::Float64, false),
        Field::new("qualite_emploi", DataType::Utf8, false),
        Field::new("parite", DataType::Utf8, true),
        Field::new("cluster", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.annee_diplome))),
        text_column(rows, |r| &r.academie),
        text_column(rows, |r| &r.region),
        text_column(rows, |r| &r.grand_domaine),
        text_column(rows, |r| &r.discipline),
        number_column(rows, |r| r.salaire_median),
        number_column(rows, |r| r.taux_insertion),
        number_column(rows, |r| r.taux_emploi_stable),
        number_column(rows, |r| r.indice_attractivite),
        text_column(rows, |r| &r.qualite_emploi),
        Arc::new(rows.iter().map(|r| r.parite.as_deref()).collect::<StringArray>()),
        text_column(rows, |r| &r.cluster),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// The generating coefficients, without noise or year trend.
fn generating_model() -> SalaryModel {
    let mut model = LinearModel {
        intercept: BASE_SALARY,
        ..Default::default()
    };
    for (domain, _, offset, _) in DOMAINS {
        model.domain_coefficients.insert(domain.to_string(), offset);
    }
    for (region, _, offset, _) in REGIONS {
        model.region_coefficients.insert(region.to_string(), offset);
    }
    SalaryModel::Linear(model)
}

/// A placeholder word cloud: soft horizontal bands in the article's tint.
fn placeholder_image(tint: [u8; 3], rng: &mut SimpleRng) -> RgbaImage {
    let (width, height) = (800, 400);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([14, 17, 23, 255]));
    for _ in 0..60 {
        let w = 40 + (rng.next_u64() % 200) as u32;
        let h = 12 + (rng.next_u64() % 30) as u32;
        let x0 = (rng.next_u64() % (width - w) as u64) as u32;
        let y0 = (rng.next_u64() % (height - h) as u64) as u32;
        let shade = 0.4 + 0.6 * rng.next_f64();
        let color = Rgba([
            (tint[0] as f64 * shade) as u8,
            (tint[1] as f64 * shade) as u8,
            (tint[2] as f64 * shade) as u8,
            255,
        ]);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, color);
            }
        }
    }
    img
}

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let defaults = DashboardConfig::default();
    let mut rng = SimpleRng::new(42);

    let rows = generate_rows(&mut rng);

    let csv_path = out_dir.join(&defaults.data_path);
    write_csv(&csv_path, &rows)?;
    let parquet_path = csv_path.with_extension("parquet");
    write_parquet(&parquet_path, &rows)?;

    let model_path = out_dir.join(&defaults.model_path);
    let model_json = serde_json::to_string_pretty(&generating_model())?;
    std::fs::write(&model_path, model_json).with_context(|| format!("writing {}", model_path.display()))?;

    let tints = [[0x63, 0x6e, 0xfa], [0xef, 0x55, 0x3b]];
    for (name, tint) in defaults.wordcloud_images.iter().zip(tints) {
        let path = out_dir.join(name);
        placeholder_image(tint, &mut rng)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    println!(
        "Wrote {} rows to {} and {}, model to {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display(),
        model_path.display()
    );
    Ok(())
}
