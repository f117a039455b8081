/// Data layer: core types, loading, the survey schema and row filters.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Column>, name index, read-only for the process lifetime
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  numeric range predicates → row indices per view
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
