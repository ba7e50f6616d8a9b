use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

pub const COL_COUNTRY: &str = "country";
pub const COL_ISO_CODE: &str = "iso_code";
pub const COL_YEAR: &str = "year";
pub const COL_CO2: &str = "co2";
pub const COL_CO2_PER_CAPITA: &str = "co2_per_capita";
pub const COL_GDP: &str = "gdp";
pub const COL_POPULATION: &str = "population";

/// Columns every input file must carry (extra columns are ignored).
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_COUNTRY,
    COL_ISO_CODE,
    COL_YEAR,
    COL_CO2,
    COL_CO2_PER_CAPITA,
    COL_GDP,
    COL_POPULATION,
];

// ---------------------------------------------------------------------------
// RawRow – one parsed row, before the inclusion filter
// ---------------------------------------------------------------------------

/// A single source row with fixed semantic column types.
///
/// Numeric cells are `None` when the source carried a null marker
/// (empty cell, `NA`, `NaN`, `null`); a present-but-zero value stays `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    pub entity_name: String,
    /// ISO code, empty for aggregates such as "World" or "Africa".
    pub entity_code: String,
    pub year: Option<i32>,
    /// Total emissions in megatonnes.
    pub co2: Option<f64>,
    /// Tonnes per person.
    pub co2_per_capita: Option<f64>,
    /// Current USD.
    pub gdp: Option<f64>,
    pub population: Option<f64>,
}

// ---------------------------------------------------------------------------
// EmissionRecord – one qualifying entity-year observation
// ---------------------------------------------------------------------------

/// A row that passed the inclusion filter, with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionRecord {
    pub entity_name: String,
    pub entity_code: String,
    pub year: i32,
    /// First day of January of `year`.
    pub date: NaiveDate,
    pub co2_per_capita: f64,
    pub total_co2: Option<f64>,
    /// `gdp / population`.
    pub gdp_per_capita: f64,
}

impl EmissionRecord {
    /// Grouping key of the entity this record belongs to.
    pub fn entity_key(&self) -> EntityKey<'_> {
        EntityKey {
            code: &self.entity_code,
            name: &self.entity_name,
        }
    }
}

/// The latest qualifying record of one entity.
pub type EntitySnapshot = EmissionRecord;

/// Identity of an entity: the (code, name) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey<'a> {
    pub code: &'a str,
    pub name: &'a str,
}

impl fmt::Display for EntityKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.code)
        }
    }
}

/// Jan 1 of `year`, or `None` when the year is outside chrono's range.
pub fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}
