use std::fmt;

use super::model::{GraduateRecord, OutcomeTable};

// ---------------------------------------------------------------------------
// Filter predicates: one value or the "all" sentinel per dimension
// ---------------------------------------------------------------------------

/// Graduation-year selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

/// Region selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Region(String),
}

/// Grand-domaine selection (geography view only).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DomainFilter {
    #[default]
    All,
    Domain(String),
}

impl YearFilter {
    pub fn matches(&self, record: &GraduateRecord) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => record.year == *y,
        }
    }
}

impl RegionFilter {
    pub fn matches(&self, record: &GraduateRecord) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Region(r) => record.region == *r,
        }
    }
}

impl DomainFilter {
    pub fn matches(&self, record: &GraduateRecord) -> bool {
        match self {
            DomainFilter::All => true,
            DomainFilter::Domain(d) => record.domain == *d,
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => f.write_str("Toutes les années"),
            YearFilter::Year(y) => write!(f, "{y}"),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => f.write_str("France entière"),
            RegionFilter::Region(r) => f.write_str(r),
        }
    }
}

impl fmt::Display for DomainFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainFilter::All => f.write_str("Tous les domaines"),
            DomainFilter::Domain(d) => f.write_str(d),
        }
    }
}

// ---------------------------------------------------------------------------
// Sidebar selection
// ---------------------------------------------------------------------------

/// Sidebar state: year then region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub year: YearFilter,
    pub region: RegionFilter,
}

impl Selection {
    /// Return indices of rows passing the year filter, then the region filter.
    pub fn apply(&self, table: &OutcomeTable) -> Vec<usize> {
        let by_year = narrow(table, 0..table.len(), |r| self.year.matches(r));
        narrow(table, by_year, |r| self.region.matches(r))
    }
}

/// Keep the indices whose record satisfies `keep`.
pub fn narrow<I, F>(table: &OutcomeTable, indices: I, keep: F) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
    F: Fn(&GraduateRecord) -> bool,
{
    indices
        .into_iter()
        .filter(|&i| table.records.get(i).is_some_and(&keep))
        .collect()
}

/// Third narrowing applied on top of the sidebar selection.
pub fn narrow_by_domain(table: &OutcomeTable, indices: &[usize], domain: &DomainFilter) -> Vec<usize> {
    narrow(table, indices.iter().copied(), |r| domain.matches(r))
}

/// Distinct domains among the given rows, in order of first appearance.
pub fn domains_in(table: &OutcomeTable, indices: &[usize]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in table.rows(indices) {
        if !seen.iter().any(|d| *d == r.domain) {
            seen.push(r.domain.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ClusterCode;

    fn record(year: i32, region: &str, domain: &str) -> GraduateRecord {
        GraduateRecord {
            year,
            region: region.to_string(),
            domain: domain.to_string(),
            discipline: None,
            salary_median: None,
            employment_rate: None,
            stable_employment_rate: None,
            attractiveness: None,
            job_quality: None,
            parity: None,
            cluster: ClusterCode::C0,
        }
    }

    fn table() -> OutcomeTable {
        OutcomeTable::from_records(vec![
            record(2020, "Bretagne", "Droit"),
            record(2020, "Occitanie", "Sciences"),
            record(2021, "Bretagne", "Sciences"),
            record(2021, "Bretagne", "Droit"),
            record(2022, "Occitanie", "Droit"),
        ])
    }

    #[test]
    fn all_sentinels_keep_every_row() {
        let t = table();
        assert_eq!(Selection::default().apply(&t), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn year_and_region_filters_commute() {
        let t = table();
        let year = YearFilter::Year(2021);
        let region = RegionFilter::Region("Bretagne".into());

        let year_first = narrow(&t, narrow(&t, 0..t.len(), |r| year.matches(r)), |r| region.matches(r));
        let region_first = narrow(&t, narrow(&t, 0..t.len(), |r| region.matches(r)), |r| year.matches(r));
        assert_eq!(year_first, region_first);
        assert_eq!(year_first, vec![2, 3]);
    }

    #[test]
    fn narrowing_is_monotonic() {
        let t = table();
        for year in [YearFilter::All, YearFilter::Year(2020), YearFilter::Year(1999)] {
            for region in [RegionFilter::All, RegionFilter::Region("Occitanie".into())] {
                let year_only = Selection { year, region: RegionFilter::All }.apply(&t);
                let both = Selection { year, region: region.clone() }.apply(&t);
                assert!(year_only.len() <= t.len());
                assert!(both.len() <= year_only.len());
                assert!(both.iter().all(|i| year_only.contains(i)));
            }
        }
    }

    #[test]
    fn domain_narrowing_and_listing() {
        let t = table();
        let rows = Selection { year: YearFilter::All, region: RegionFilter::Region("Bretagne".into()) }.apply(&t);
        assert_eq!(domains_in(&t, &rows), vec!["Droit".to_string(), "Sciences".to_string()]);
        let droit = narrow_by_domain(&t, &rows, &DomainFilter::Domain("Droit".into()));
        assert_eq!(droit, vec![0, 3]);
        assert_eq!(narrow_by_domain(&t, &rows, &DomainFilter::All), rows);
    }

    #[test]
    fn unmatched_year_yields_empty_view() {
        let t = table();
        let sel = Selection { year: YearFilter::Year(1990), region: RegionFilter::All };
        assert!(sel.apply(&t).is_empty());
    }
}
