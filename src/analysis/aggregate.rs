use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::quartile::QuartileMap;
use super::stats::Accumulator;
use crate::data::model::EmissionRecord;

// ---------------------------------------------------------------------------
// Global time series: mean co2_per_capita per date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateMean {
    pub date: NaiveDate,
    /// Missing when no record of this date has a finite value.
    pub mean_co2_per_capita: Option<f64>,
    /// Records that contributed to the mean.
    pub count: usize,
}

/// Group records by date and average `co2_per_capita`, ascending by date.
pub fn mean_by_date(records: &[EmissionRecord]) -> Vec<DateMean> {
    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for r in records {
        groups.entry(r.date).or_default().push(r.co2_per_capita);
    }

    groups
        .into_iter()
        .map(|(date, acc)| DateMean {
            date,
            mean_co2_per_capita: acc.mean(),
            count: acc.count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap series: mean co2_per_capita per (year, GDP quartile)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub year: i32,
    pub quartile: u8,
    pub mean_co2_per_capita: Option<f64>,
    pub count: usize,
}

/// Join records to their entity's quartile and average per (year, quartile).
///
/// Records whose `entity_code` is not in `quartiles` are left out of this
/// series (inner join). Cells are ordered by year, then quartile.
pub fn mean_by_year_and_quartile(
    records: &[EmissionRecord],
    quartiles: &QuartileMap,
) -> Vec<HeatmapCell> {
    let mut groups: BTreeMap<(i32, u8), Accumulator> = BTreeMap::new();
    let mut unmatched = 0usize;

    for r in records {
        match quartiles.get(&r.entity_code) {
            Some(&q) => groups.entry((r.year, q)).or_default().push(r.co2_per_capita),
            None => unmatched += 1,
        }
    }
    if unmatched > 0 {
        log::debug!("{unmatched} records have no GDP quartile and are left out of the heatmap");
    }

    groups
        .into_iter()
        .map(|((year, quartile), acc)| HeatmapCell {
            year,
            quartile,
            mean_co2_per_capita: acc.mean(),
            count: acc.count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Total emissions per date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTotal {
    pub date: NaiveDate,
    /// Sum of `total_co2` in megatonnes; missing when no record carries it.
    pub total_co2: Option<f64>,
    pub count: usize,
}

/// Sum `total_co2` per date over the records that have it, ascending by date.
pub fn total_emissions_by_date(records: &[EmissionRecord]) -> Vec<DateTotal> {
    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for r in records {
        let acc = groups.entry(r.date).or_default();
        if let Some(total) = r.total_co2 {
            acc.push(total);
        }
    }

    groups
        .into_iter()
        .map(|(date, acc)| DateTotal {
            date,
            total_co2: acc.total(),
            count: acc.count,
        })
        .collect()
}
