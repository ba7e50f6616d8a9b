use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::DateMean;
use super::stats::Accumulator;
use crate::data::model::EmissionRecord;

// ---------------------------------------------------------------------------
// Cumulative sum of per-date totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    /// Sum of co2_per_capita over every record of this date.
    pub period_sum: f64,
    /// Running total of `period_sum` up to and including this date.
    pub cumulative: f64,
}

/// Per-date sums of `co2_per_capita`, running-accumulated over ascending dates.
///
/// This sums the records of a date (not their mean). Non-finite values add nothing.
pub fn cumulative_sum_by_date(records: &[EmissionRecord]) -> Vec<CumulativePoint> {
    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for r in records {
        groups.entry(r.date).or_default().push(r.co2_per_capita);
    }

    let mut running = 0.0;
    groups
        .into_iter()
        .map(|(date, acc)| {
            running += acc.sum;
            CumulativePoint {
                date,
                period_sum: acc.sum,
                cumulative: running,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Year-over-year percent change of the global mean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentChangePoint {
    pub date: NaiveDate,
    pub mean_co2_per_capita: Option<f64>,
    /// Missing for the first date and wherever the change is undefined.
    pub percent_change: Option<f64>,
}

/// `100 × (current − previous) / previous`.
///
/// Undefined (`None`) when either side is missing or `previous` is exactly zero.
pub fn percent_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(cur)) if prev != 0.0 => {
            let change = 100.0 * (cur - prev) / prev;
            change.is_finite().then_some(change)
        }
        _ => None,
    }
}

/// Percent change between consecutive points of the global time series.
///
/// `series` must be ascending by date, as returned by
/// [`mean_by_date`](super::aggregate::mean_by_date).
pub fn year_over_year(series: &[DateMean]) -> Vec<PercentChangePoint> {
    let mut previous: Option<Option<f64>> = None;
    series
        .iter()
        .map(|point| {
            let current = point.mean_co2_per_capita;
            let change = previous.and_then(|prev| percent_change(prev, current));
            previous = Some(current);
            PercentChangePoint {
                date: point.date,
                mean_co2_per_capita: current,
                percent_change: change,
            }
        })
        .collect()
}
