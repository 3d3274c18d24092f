use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{ClusterCode, GraduateRecord, JobQuality, OutcomeTable, Parity};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the outcome table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one outcome per line (what the notebook exports)
/// * `.json`    – `[{ "annee_diplome": 2020, "region": "...", ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path) -> Result<OutcomeTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(OutcomeTable::from_records(records))
}

// ---------------------------------------------------------------------------
// RawRecord – untyped cells shared by all formats
// ---------------------------------------------------------------------------

/// One row as text cells, before validation. Columns the dashboard does not
/// use are ignored; absent columns read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    annee_diplome: Option<String>,
    region: Option<String>,
    grand_domaine: Option<String>,
    discipline: Option<String>,
    salaire_median: Option<String>,
    taux_insertion: Option<String>,
    taux_emploi_stable: Option<String>,
    indice_attractivite: Option<String>,
    qualite_emploi: Option<String>,
    parite: Option<String>,
    cluster: Option<String>,
}

impl RawRecord {
    /// Assign a cell by column name; unused columns are dropped.
    fn set(&mut self, column: &str, value: Option<String>) {
        let slot = match column {
            "annee_diplome" => &mut self.annee_diplome,
            "region" => &mut self.region,
            "grand_domaine" => &mut self.grand_domaine,
            "discipline" => &mut self.discipline,
            "salaire_median" => &mut self.salaire_median,
            "taux_insertion" => &mut self.taux_insertion,
            "taux_emploi_stable" => &mut self.taux_emploi_stable,
            "indice_attractivite" => &mut self.indice_attractivite,
            "qualite_emploi" => &mut self.qualite_emploi,
            "parite" => &mut self.parite,
            "cluster" => &mut self.cluster,
            _ => return,
        };
        *slot = value;
    }

    fn into_record(self, row: usize) -> Result<GraduateRecord> {
        let year_text = required(self.annee_diplome, row, "annee_diplome")?;
        let year = parse_year(&year_text).with_context(|| format!("Row {row}: invalid annee_diplome '{year_text}'"))?;

        let cluster_text = required(self.cluster, row, "cluster")?;
        let cluster = ClusterCode::parse(&cluster_text)
            .with_context(|| format!("Row {row}: cluster '{cluster_text}' is not one of 0, 1, 2, 3"))?;

        Ok(GraduateRecord {
            year,
            region: required(self.region, row, "region")?,
            domain: required(self.grand_domaine, row, "grand_domaine")?,
            discipline: non_empty(self.discipline),
            salary_median: parse_number(self.salaire_median, row, "salaire_median")?,
            employment_rate: parse_number(self.taux_insertion, row, "taux_insertion")?,
            stable_employment_rate: parse_number(self.taux_emploi_stable, row, "taux_emploi_stable")?,
            attractiveness: parse_number(self.indice_attractivite, row, "indice_attractivite")?,
            job_quality: parse_category::<JobQuality>(self.qualite_emploi, row),
            parity: parse_category::<Parity>(self.parite, row),
            cluster,
        })
    }
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty() && !is_nan_text(s))
}

fn required(cell: Option<String>, row: usize, column: &str) -> Result<String> {
    non_empty(cell).with_context(|| format!("Row {row}: missing required column '{column}'"))
}

fn is_nan_text(s: &str) -> bool {
    s.eq_ignore_ascii_case("nan")
}

fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    (f.fract() == 0.0 && f.is_finite()).then_some(f as i32)
}

fn parse_number(cell: Option<String>, row: usize, column: &str) -> Result<Option<f64>> {
    let Some(text) = non_empty(cell) else {
        return Ok(None);
    };
    let value = text
        .parse::<f64>()
        .with_context(|| format!("Row {row}, {column}: '{text}' is not a number"))?;
    Ok(value.is_finite().then_some(value))
}

/// Out-of-vocabulary labels become missing values, like an ordered
/// categorical would treat them.
fn parse_category<T: std::str::FromStr>(cell: Option<String>, row: usize) -> Option<T> {
    let text = non_empty(cell)?;
    match text.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::debug!("Row {row}: ignoring out-of-vocabulary category '{text}'");
            None
        }
    }
}

fn validate_rows(raw: Vec<RawRecord>) -> Result<Vec<GraduateRecord>> {
    raw.into_iter()
        .enumerate()
        .map(|(row, r)| r.into_record(row))
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<GraduateRecord>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse CSV from any reader (header row required).
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<GraduateRecord>> {
    let mut raw = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        raw.push(result.with_context(|| format!("CSV row {row_no}"))?);
    }
    validate_rows(raw)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<Vec<GraduateRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Vec<GraduateRecord>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut raw = Vec::with_capacity(rows.len());
    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let mut record = RawRecord::default();
        for (key, val) in obj {
            record.set(key, json_cell(val));
        }
        raw.push(record);
    }
    validate_rows(raw)
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<GraduateRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut raw = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        // Rows are numbered across the whole file, like `validate_rows` does.
        let offset = raw.len();

        for row in 0..batch.num_rows() {
            let mut record = RawRecord::default();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let cell = extract_cell(batch.column(col_idx), row)
                    .with_context(|| format!("Row {}: reading column '{}'", offset + row, field.name()))?;
                record.set(field.name(), cell);
            }
            raw.push(record);
        }
    }
    validate_rows(raw)
}

/// Extract a single cell from an Arrow column as text.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row)
            .to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row)
            .to_string(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row)
            .to_string(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row)
            .to_string(),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row)
            .to_string(),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .context("expected BooleanArray")?
            .value(row)
            .to_string(),
        DataType::Dictionary(_, _) => {
            arrow::util::display::array_value_to_string(col, row).context("formatting dictionary value")?
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, DictionaryArray, Int32Builder, ListBuilder};
    use arrow::datatypes::{Field, Int8Type, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const HEADER: &str = "annee_diplome,academie,region,grand_domaine,discipline,salaire_median,taux_insertion,taux_emploi_stable,indice_attractivite,qualite_emploi,parite,cluster";

    fn csv_from(body: &str) -> Result<Vec<GraduateRecord>> {
        let text = format!("{HEADER}\n{body}");
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn csv_row_is_typed() {
        let rows = csv_from("2020,Lyon,Auvergne-Rhône-Alpes,Sciences,Chimie,1950,91.5,72,0.61,Élevée,Mixte,3\n").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.year, 2020);
        assert_eq!(r.region, "Auvergne-Rhône-Alpes");
        assert_eq!(r.domain, "Sciences");
        assert_eq!(r.discipline.as_deref(), Some("Chimie"));
        assert_eq!(r.salary_median, Some(1950.0));
        assert_eq!(r.job_quality, Some(JobQuality::Elevee));
        assert_eq!(r.parity, Some(Parity::Mixte));
        assert_eq!(r.cluster, ClusterCode::C3);
    }

    #[test]
    fn empty_and_unknown_cells_are_missing() {
        let rows = csv_from("2021.0,X,Bretagne,Droit,,,nan,,,Inconnue,,1.0\n").unwrap();
        let r = &rows[0];
        assert_eq!(r.year, 2021);
        assert_eq!(r.discipline, None);
        assert_eq!(r.salary_median, None);
        assert_eq!(r.employment_rate, None);
        assert_eq!(r.job_quality, None);
        assert_eq!(r.parity, None);
        assert_eq!(r.cluster, ClusterCode::C1);
    }

    #[test]
    fn invalid_cluster_is_rejected() {
        let err = csv_from("2020,X,Bretagne,Droit,D,1800,90,70,0.5,Standard,Mixte,7\n").unwrap_err();
        assert!(format!("{err:#}").contains("cluster"));
    }

    #[test]
    fn missing_region_is_rejected() {
        let err = csv_from("2020,X,,Droit,D,1800,90,70,0.5,Standard,Mixte,0\n").unwrap_err();
        assert!(format!("{err:#}").contains("region"));
    }

    #[test]
    fn json_records_accept_numbers_and_nulls() {
        let rows = parse_json(
            r#"[{"annee_diplome": 2019, "region": "Normandie", "grand_domaine": "Santé",
                 "salaire_median": 2100.5, "taux_insertion": null, "cluster": 0,
                 "qualite_emploi": "Excellente", "extra": [1, 2]}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].year, 2019);
        assert_eq!(rows[0].salary_median, Some(2100.5));
        assert_eq!(rows[0].employment_rate, None);
        assert_eq!(rows[0].job_quality, Some(JobQuality::Excellente));
        assert_eq!(rows[0].cluster, ClusterCode::C0);
    }

    // ---- Parquet ----

    /// Write `columns` to `<dir>/name` in one row group.
    fn write_parquet(dir: &Path, name: &str, columns: Vec<(&str, ArrayRef)>) -> std::path::PathBuf {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(n, a)| Field::new(*n, a.data_type().clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect()).unwrap();

        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    /// `n` rows shaped like a pandas export: categorical quality column
    /// dictionary-encoded, integer cluster codes.
    fn outcome_columns(n: usize, clusters: Vec<i32>) -> Vec<(&'static str, ArrayRef)> {
        let qualities = ["Standard", "Élevée", "Excellente"];
        let quality: DictionaryArray<Int8Type> = (0..n).map(|i| qualities[(i + 1) % 3]).collect();
        vec![
            ("annee_diplome", Arc::new(Int64Array::from_iter_values((0..n).map(|i| 2018 + (i % 4) as i64))) as ArrayRef),
            ("region", Arc::new(StringArray::from_iter_values((0..n).map(|_| "Bretagne"))) as ArrayRef),
            ("grand_domaine", Arc::new(StringArray::from_iter_values((0..n).map(|_| "Droit"))) as ArrayRef),
            ("salaire_median", Arc::new(Float64Array::from_iter_values((0..n).map(|i| 1800.0 + i as f64))) as ArrayRef),
            ("taux_insertion", Arc::new(Float32Array::from_iter_values((0..n).map(|_| 91.5f32))) as ArrayRef),
            ("qualite_emploi", Arc::new(quality) as ArrayRef),
            ("cluster", Arc::new(Int32Array::from(clusters)) as ArrayRef),
        ]
    }

    #[test]
    fn parquet_reads_dictionary_and_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let n = 3000;
        let path = write_parquet(dir.path(), "outcomes.parquet", outcome_columns(n, vec![2; n]));

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), n);
        let r = &table.records[0];
        assert_eq!(r.year, 2018);
        assert_eq!(r.region, "Bretagne");
        assert_eq!(r.salary_median, Some(1800.0));
        assert_eq!(r.employment_rate, Some(91.5));
        assert_eq!(r.job_quality, Some(JobQuality::Elevee));
        assert_eq!(r.cluster, ClusterCode::C2);
        assert_eq!(table.records[n - 1].salary_median, Some(1800.0 + (n - 1) as f64));
        assert_eq!(table.years, vec![2018, 2019, 2020, 2021]);
    }

    #[test]
    fn parquet_invalid_cluster_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let n = 3000;
        let mut clusters = vec![1; n];
        clusters[2500] = 9;
        let path = write_parquet(dir.path(), "outcomes.pq", outcome_columns(n, clusters));

        let err = load_file(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 2500: cluster '9'"), "{msg}");
    }

    #[test]
    fn parquet_cell_errors_use_file_row_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let n = 3000;
        // A list column is unsupported; nulls are read without looking at the type.
        let mut notes = ListBuilder::new(Int32Builder::new());
        for i in 0..n {
            if i == 2500 {
                notes.values().append_value(1);
                notes.append(true);
            } else {
                notes.append(false);
            }
        }
        let mut columns = outcome_columns(n, vec![0; n]);
        columns.push(("notes", Arc::new(notes.finish()) as ArrayRef));
        let path = write_parquet(dir.path(), "outcomes.parquet", columns);

        let err = load_file(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 2500: reading column 'notes'"), "{msg}");
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains("xlsx"));
    }
}
