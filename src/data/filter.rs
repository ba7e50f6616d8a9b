use serde::Serialize;

use super::model::{year_start, EmissionRecord, RawRow};

// ---------------------------------------------------------------------------
// Inclusion predicate: which raw rows become EmissionRecords
// ---------------------------------------------------------------------------

/// Earliest year kept by default.
pub const DEFAULT_MIN_YEAR: i32 = 1960;

/// Why a raw row was left out of the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    MissingCo2PerCapita,
    MissingGdp,
    /// Population absent, zero or negative.
    NonPositivePopulation,
    /// Year absent or before the configured minimum.
    YearOutOfRange,
    /// A value or derived value is NaN / infinite.
    NonFinite,
}

/// Per-reason counts of the data-quality filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub missing_co2_per_capita: usize,
    pub missing_gdp: usize,
    pub non_positive_population: usize,
    pub year_out_of_range: usize,
    pub non_finite: usize,
}

impl FilterStats {
    fn record(&mut self, exclusion: Exclusion) {
        match exclusion {
            Exclusion::MissingCo2PerCapita => self.missing_co2_per_capita += 1,
            Exclusion::MissingGdp => self.missing_gdp += 1,
            Exclusion::NonPositivePopulation => self.non_positive_population += 1,
            Exclusion::YearOutOfRange => self.year_out_of_range += 1,
            Exclusion::NonFinite => self.non_finite += 1,
        }
    }

    /// Number of rows dropped for any reason.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }
}

/// Apply the inclusion predicate to a single row.
///
/// A row qualifies when:
/// * `co2_per_capita` is present
/// * `gdp` is present
/// * `population > 0`
/// * `year >= min_year`
///
/// Qualifying rows get `date = Jan 1 of year` and `gdp_per_capita = gdp / population`.
pub fn to_record(row: &RawRow, min_year: i32) -> Result<EmissionRecord, Exclusion> {
    let co2_per_capita = row.co2_per_capita.ok_or(Exclusion::MissingCo2PerCapita)?;
    let gdp = row.gdp.ok_or(Exclusion::MissingGdp)?;
    let population = match row.population {
        Some(p) if p > 0.0 => p,
        _ => return Err(Exclusion::NonPositivePopulation),
    };
    let year = match row.year {
        Some(y) if y >= min_year => y,
        _ => return Err(Exclusion::YearOutOfRange),
    };
    let date = year_start(year).ok_or(Exclusion::YearOutOfRange)?;

    let gdp_per_capita = gdp / population;
    if !co2_per_capita.is_finite() || !gdp_per_capita.is_finite() {
        return Err(Exclusion::NonFinite);
    }

    Ok(EmissionRecord {
        entity_name: row.entity_name.clone(),
        entity_code: row.entity_code.clone(),
        year,
        date,
        co2_per_capita,
        total_co2: row.co2.filter(|v| v.is_finite()),
        gdp_per_capita,
    })
}

/// Keep the qualifying rows, in input order, and count the rest by reason.
pub fn filter_rows(rows: &[RawRow], min_year: i32) -> (Vec<EmissionRecord>, FilterStats) {
    let mut stats = FilterStats {
        rows_read: rows.len(),
        ..FilterStats::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        match to_record(row, min_year) {
            Ok(record) => records.push(record),
            Err(exclusion) => stats.record(exclusion),
        }
    }
    stats.rows_kept = records.len();

    log::debug!(
        "Inclusion filter kept {} of {} rows ({} dropped)",
        stats.rows_kept,
        stats.rows_read,
        stats.rows_dropped()
    );
    (records, stats)
}
