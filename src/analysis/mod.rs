/// Analysis layer: pure functions from records to chart-ready tables.
///
/// ```text
///   Vec<EmissionRecord>
///        │
///        ├──────────────► aggregate::mean_by_date ──► series::year_over_year
///        │                series::cumulative_sum_by_date
///        ▼
///   snapshot::latest_per_entity
///        │
///        ├──► quartile::assign_quartiles ──► aggregate::mean_by_year_and_quartile
///        ├──► ranking::top_by_*
///        └──► regression::regress_co2_on_gdp
/// ```
///
/// Each function reads its inputs and returns a new value; nothing is edited in place.

pub mod aggregate;
pub mod quartile;
pub mod ranking;
pub mod regression;
pub mod series;
pub mod snapshot;
pub mod stats;
