/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → OutcomeTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ OutcomeTable  │  Vec<GraduateRecord>, distinct years/regions/domains
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year → region (→ domain) predicates → row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by mean / count per view
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
