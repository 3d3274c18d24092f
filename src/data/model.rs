use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Ordered categories
// ---------------------------------------------------------------------------

/// Job-quality index computed upstream (stability, executive status).
/// Declaration order is the category order: `Standard < Elevee < Excellente`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobQuality {
    Standard,
    Elevee,
    Excellente,
}

impl JobQuality {
    pub const ALL: [JobQuality; 3] = [JobQuality::Standard, JobQuality::Elevee, JobQuality::Excellente];

    pub fn label(self) -> &'static str {
        match self {
            JobQuality::Standard => "Standard",
            JobQuality::Elevee => "Élevée",
            JobQuality::Excellente => "Excellente",
        }
    }

    /// Position in [`JobQuality::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Gender balance of a programme, from the share of women.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parity {
    MajoriteMasculine,
    Mixte,
    MajoriteFeminine,
}

impl Parity {
    pub const ALL: [Parity; 3] = [Parity::MajoriteMasculine, Parity::Mixte, Parity::MajoriteFeminine];

    pub fn label(self) -> &'static str {
        match self {
            Parity::MajoriteMasculine => "Majorité Masculine",
            Parity::Mixte => "Mixte",
            Parity::MajoriteFeminine => "Majorité Féminine",
        }
    }
}

/// Text that is not one of the enumeration labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for JobQuality {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobQuality::ALL
            .into_iter()
            .find(|q| q.label() == s.trim())
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl FromStr for Parity {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parity::ALL
            .into_iter()
            .find(|p| p.label() == s.trim())
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for JobQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ClusterCode – one of the four K-Means profiles
// ---------------------------------------------------------------------------

/// K-Means profile assigned to the academy of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClusterCode {
    C0,
    C1,
    C2,
    C3,
}

impl ClusterCode {
    pub const ALL: [ClusterCode; 4] = [ClusterCode::C0, ClusterCode::C1, ClusterCode::C2, ClusterCode::C3];

    /// The code as written in the dataset ("0".."3").
    pub fn code(self) -> &'static str {
        match self {
            ClusterCode::C0 => "0",
            ClusterCode::C1 => "1",
            ClusterCode::C2 => "2",
            ClusterCode::C3 => "3",
        }
    }

    /// Human-readable profile name.
    pub fn name(self) -> &'static str {
        match self {
            ClusterCode::C0 => "Pôles d'Excellence",
            ClusterCode::C1 => "Régions en Développement",
            ClusterCode::C2 => "Académies Spécifiques",
            ClusterCode::C3 => "Pôles Dynamiques",
        }
    }

    /// One-line reading of the profile.
    pub fn description(self) -> &'static str {
        match self {
            ClusterCode::C0 => "Salaires les plus bas mais stabilité d'emploi correcte.",
            ClusterCode::C1 => "Salaires et taux d'insertion légèrement inférieurs à la moyenne.",
            ClusterCode::C2 => "Salaires les plus élevés (typiquement l'Île-de-France).",
            ClusterCode::C3 => "Le meilleur équilibre avec les meilleurs taux d'insertion et de stabilité.",
        }
    }

    /// Parse a code cell. Float spellings such as `"2.0"` are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_suffix(".0").unwrap_or(s);
        ClusterCode::ALL.into_iter().find(|c| c.code() == s)
    }
}

impl fmt::Display for ClusterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// GraduateRecord – one row of the outcome table
// ---------------------------------------------------------------------------

/// One (year, academy, discipline) outcome row.
#[derive(Debug, Clone, PartialEq)]
pub struct GraduateRecord {
    pub year: i32,
    pub region: String,
    pub domain: String,
    pub discipline: Option<String>,
    /// Monthly net median salary (€).
    pub salary_median: Option<f64>,
    /// Employment rate (%).
    pub employment_rate: Option<f64>,
    /// Stable-employment rate (%).
    pub stable_employment_rate: Option<f64>,
    pub attractiveness: Option<f64>,
    pub job_quality: Option<JobQuality>,
    pub parity: Option<Parity>,
    pub cluster: ClusterCode,
}

/// Numeric columns that can be averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Salary,
    EmploymentRate,
    StableEmploymentRate,
    Attractiveness,
}

impl Metric {
    pub fn of(self, record: &GraduateRecord) -> Option<f64> {
        match self {
            Metric::Salary => record.salary_median,
            Metric::EmploymentRate => record.employment_rate,
            Metric::StableEmploymentRate => record.stable_employment_rate,
            Metric::Attractiveness => record.attractiveness,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Salary => "Salaire Médian (€)",
            Metric::EmploymentRate => "Taux d'Insertion (%)",
            Metric::StableEmploymentRate => "Taux d'Emploi Stable (%)",
            Metric::Attractiveness => "Indice",
        }
    }
}

// ---------------------------------------------------------------------------
// OutcomeTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable table with pre-computed distinct values.
#[derive(Debug, Clone, Default)]
pub struct OutcomeTable {
    pub records: Vec<GraduateRecord>,
    /// Distinct graduation years, ascending.
    pub years: Vec<i32>,
    /// Distinct regions, ascending.
    pub regions: Vec<String>,
    /// Distinct grand domaines, ascending.
    pub domains: Vec<String>,
}

impl OutcomeTable {
    pub fn from_records(records: Vec<GraduateRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut domains = BTreeSet::new();
        for r in &records {
            years.insert(r.year);
            regions.insert(r.region.clone());
            domains.insert(r.domain.clone());
        }
        OutcomeTable {
            records,
            years: years.into_iter().collect(),
            regions: regions.into_iter().collect(),
            domains: domains.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve row indices into record references.
    pub fn rows(&self, indices: &[usize]) -> Vec<&GraduateRecord> {
        indices.iter().filter_map(|&i| self.records.get(i)).collect()
    }

    /// Every record, in file order.
    pub fn all_rows(&self) -> Vec<&GraduateRecord> {
        self.records.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn four_cluster_codes_have_four_distinct_names() {
        let names: HashSet<&str> = ClusterCode::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), 4);
        for c in ClusterCode::ALL {
            assert_eq!(ClusterCode::parse(c.code()), Some(c));
        }
    }

    #[test]
    fn cluster_parse_accepts_float_spelling() {
        assert_eq!(ClusterCode::parse("2.0"), Some(ClusterCode::C2));
        assert_eq!(ClusterCode::parse(" 3 "), Some(ClusterCode::C3));
        assert_eq!(ClusterCode::parse("4"), None);
        assert_eq!(ClusterCode::parse(""), None);
    }

    #[test]
    fn categories_are_ordered() {
        assert!(JobQuality::Standard < JobQuality::Elevee);
        assert!(JobQuality::Elevee < JobQuality::Excellente);
        assert!(Parity::MajoriteMasculine < Parity::Mixte);
        assert!(Parity::Mixte < Parity::MajoriteFeminine);
        assert_eq!("Élevée".parse::<JobQuality>(), Ok(JobQuality::Elevee));
        assert!("élevée".parse::<JobQuality>().is_err());
        assert_eq!("Mixte".parse::<Parity>(), Ok(Parity::Mixte));
    }

    #[test]
    fn each_metric_reads_its_own_column() {
        let record = GraduateRecord {
            year: 2021,
            region: "Bretagne".into(),
            domain: "Sciences".into(),
            discipline: None,
            salary_median: Some(2100.0),
            employment_rate: Some(93.0),
            stable_employment_rate: Some(78.0),
            attractiveness: None,
            job_quality: None,
            parity: None,
            cluster: ClusterCode::C1,
        };
        let metrics = [Metric::Salary, Metric::EmploymentRate, Metric::StableEmploymentRate, Metric::Attractiveness];
        let values: Vec<Option<f64>> = metrics.iter().map(|m| m.of(&record)).collect();
        assert_eq!(values, vec![Some(2100.0), Some(93.0), Some(78.0), None]);
        let labels: HashSet<&str> = metrics.iter().map(|m| m.label()).collect();
        assert_eq!(labels.len(), 4);
    }
}
