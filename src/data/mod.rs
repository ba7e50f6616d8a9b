/// Data layer: typed rows, loading, and the inclusion filter.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRow>   (fatal: LoadError)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  inclusion predicate → Vec<EmissionRecord> + FilterStats
///   └──────────┘
///        │
///        ▼
///   analysis::*
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod filter;
