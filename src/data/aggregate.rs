//! Group-by aggregations feeding the charts.
//!
//! Every mean skips missing values. Aggregating an empty slice yields an
//! empty result (or `None`), never a panic, so views can be drawn for any
//! filter combination.

use std::collections::BTreeMap;

use super::model::{ClusterCode, GraduateRecord, Metric, Parity};

/// Overseas regions shown beside the metropolitan map.
pub const OVERSEAS_REGIONS: [&str; 5] = ["Guadeloupe", "Guyane", "Martinique", "Mayotte", "La Réunion"];

pub fn is_overseas(region: &str) -> bool {
    OVERSEAS_REGIONS.contains(&region)
}

/// Arithmetic mean of the present values; `None` when there are none.
pub fn mean<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Dataset overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub n_years: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub n_rows: usize,
}

pub fn overview(records: &[&GraduateRecord]) -> Overview {
    let counts = year_counts(records);
    Overview {
        n_years: counts.len(),
        first_year: counts.first().map(|(y, _)| *y),
        last_year: counts.last().map(|(y, _)| *y),
        n_rows: records.len(),
    }
}

/// Rows per graduation year, ascending year.
pub fn year_counts(records: &[&GraduateRecord]) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.year).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Rows per grand domaine, most frequent first (ties by name).
pub fn domain_counts(records: &[&GraduateRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.domain.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().map(|(d, n)| (d.to_string(), n)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// Mean of `metric` per region, ascending region. Regions where the metric is
/// never present are left out.
pub fn mean_by_region(records: &[&GraduateRecord], metric: Metric) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
    for r in records {
        groups.entry(r.region.as_str()).or_default().push(metric.of(r));
    }
    groups
        .into_iter()
        .filter_map(|(region, values)| mean(values).map(|m| (region.to_string(), m)))
        .collect()
}

/// Mean attractiveness of the overseas regions, lowest first.
pub fn overseas_means(records: &[&GraduateRecord]) -> Vec<(String, f64)> {
    let overseas: Vec<&GraduateRecord> = records.iter().copied().filter(|r| is_overseas(&r.region)).collect();
    let mut out = mean_by_region(&overseas, Metric::Attractiveness);
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

// ---------------------------------------------------------------------------
// Social analysis
// ---------------------------------------------------------------------------

/// One bubble of the strategic-positioning chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainPosition {
    pub domain: String,
    pub mean_salary: Option<f64>,
    pub mean_employment: Option<f64>,
    /// Number of rows with a discipline.
    pub count: usize,
}

pub fn domain_positions(records: &[&GraduateRecord]) -> Vec<DomainPosition> {
    let mut groups: BTreeMap<&str, Vec<&GraduateRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.domain.as_str()).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(domain, rows)| DomainPosition {
            domain: domain.to_string(),
            mean_salary: mean(rows.iter().map(|r| Metric::Salary.of(r))),
            mean_employment: mean(rows.iter().map(|r| Metric::EmploymentRate.of(r))),
            count: rows.iter().filter(|r| r.discipline.is_some()).count(),
        })
        .collect()
}

/// Job-quality composition of one domain; `shares` follow
/// [`JobQuality::ALL`](super::model::JobQuality::ALL).
#[derive(Debug, Clone, PartialEq)]
pub struct QualityShare {
    pub domain: String,
    pub shares: [f64; 3],
}

/// Share of each job-quality level per domain. Domains with no rated row are
/// omitted, so every `shares` array sums to 1.
pub fn quality_shares(records: &[&GraduateRecord]) -> Vec<QualityShare> {
    let mut counts: BTreeMap<&str, [usize; 3]> = BTreeMap::new();
    for r in records {
        if let Some(q) = r.job_quality {
            counts.entry(r.domain.as_str()).or_default()[q.index()] += 1;
        }
    }
    counts
        .into_iter()
        .filter_map(|(domain, c)| {
            let total: usize = c.iter().sum();
            (total > 0).then(|| QualityShare {
                domain: domain.to_string(),
                shares: c.map(|n| n as f64 / total as f64),
            })
        })
        .collect()
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Quartiles use linear interpolation; whiskers reach the furthest sample
    /// within 1.5 × IQR of the box. `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let lower_whisker = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryBox {
    pub domain: String,
    pub parity: Parity,
    pub stats: BoxStats,
}

/// Salary distribution per (domain, parity). Rows without parity or salary
/// are dropped.
pub fn salary_boxes(records: &[&GraduateRecord]) -> Vec<SalaryBox> {
    let mut groups: BTreeMap<(&str, Parity), Vec<f64>> = BTreeMap::new();
    for r in records {
        if let (Some(parity), Some(salary)) = (r.parity, r.salary_median) {
            groups.entry((r.domain.as_str(), parity)).or_default().push(salary);
        }
    }
    groups
        .into_iter()
        .filter_map(|((domain, parity), salaries)| {
            BoxStats::from_values(&salaries).map(|stats| SalaryBox {
                domain: domain.to_string(),
                parity,
                stats,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Most frequent cluster per region; ties go to the smallest code.
pub fn dominant_cluster_by_region(records: &[&GraduateRecord]) -> Vec<(String, ClusterCode)> {
    let mut counts: BTreeMap<&str, BTreeMap<ClusterCode, usize>> = BTreeMap::new();
    for r in records {
        *counts.entry(r.region.as_str()).or_default().entry(r.cluster).or_default() += 1;
    }
    counts
        .into_iter()
        .filter_map(|(region, by_cluster)| {
            // Iteration is ascending by code, so strict `>` keeps the smallest on ties.
            let mut best: Option<(ClusterCode, usize)> = None;
            for (code, n) in by_cluster {
                match best {
                    Some((_, m)) if n <= m => {}
                    _ => best = Some((code, n)),
                }
            }
            best.map(|(code, _)| (region.to_string(), code))
        })
        .collect()
}

/// Mean outcomes of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterProfile {
    pub cluster: ClusterCode,
    pub mean_salary: Option<f64>,
    pub mean_employment: Option<f64>,
    pub mean_stable_employment: Option<f64>,
    pub mean_attractiveness: Option<f64>,
}

impl ClusterProfile {
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Salary => self.mean_salary,
            Metric::EmploymentRate => self.mean_employment,
            Metric::StableEmploymentRate => self.mean_stable_employment,
            Metric::Attractiveness => self.mean_attractiveness,
        }
    }
}

/// Profiles of the clusters present in `records`, by code.
pub fn cluster_profiles(records: &[&GraduateRecord]) -> Vec<ClusterProfile> {
    ClusterCode::ALL
        .into_iter()
        .filter_map(|cluster| {
            let rows: Vec<&GraduateRecord> = records.iter().copied().filter(|r| r.cluster == cluster).collect();
            let mean_of = |metric: Metric| mean(rows.iter().map(|r| metric.of(r)));
            (!rows.is_empty()).then(|| ClusterProfile {
                cluster,
                mean_salary: mean_of(Metric::Salary),
                mean_employment: mean_of(Metric::EmploymentRate),
                mean_stable_employment: mean_of(Metric::StableEmploymentRate),
                mean_attractiveness: mean_of(Metric::Attractiveness),
            })
        })
        .collect()
}
