use serde::Serialize;

use crate::analysis::aggregate::{
    mean_by_date, mean_by_year_and_quartile, total_emissions_by_date, DateMean, DateTotal,
    HeatmapCell,
};
use crate::analysis::quartile::{
    assign_quartiles, quartile_map, quartile_summary, QuartileAssignment, QuartileSummary,
};
use crate::analysis::ranking::{top_by_co2_per_capita, top_by_total_co2, RankedEntity};
use crate::analysis::regression::{regress_co2_on_gdp, RegressionResult};
use crate::analysis::series::{
    cumulative_sum_by_date, year_over_year, CumulativePoint, PercentChangePoint,
};
use crate::analysis::snapshot::latest_per_entity;
use crate::analysis::stats::{describe, Summary};
use crate::config::AnalysisConfig;
use crate::data::filter::{filter_rows, FilterStats};
use crate::data::model::{EmissionRecord, EntitySnapshot, RawRow};

// ---------------------------------------------------------------------------
// The full analysis
// ---------------------------------------------------------------------------

/// Descriptive statistics of the snapshot set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub co2_per_capita: Summary,
    pub gdp_per_capita: Summary,
}

/// Every table the analysis produces, built once from the raw rows.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub config: AnalysisConfig,
    pub filter_stats: FilterStats,
    /// Qualifying records in input order (not exported in the report).
    #[serde(skip)]
    pub records: Vec<EmissionRecord>,
    pub snapshots: Vec<EntitySnapshot>,
    pub snapshot_summary: SnapshotSummary,
    pub quartiles: Vec<QuartileAssignment>,
    pub quartile_summary: Vec<QuartileSummary>,
    pub global_series: Vec<DateMean>,
    pub total_emissions: Vec<DateTotal>,
    pub heatmap: Vec<HeatmapCell>,
    pub cumulative: Vec<CumulativePoint>,
    pub year_over_year: Vec<PercentChangePoint>,
    pub top_co2_per_capita: Vec<RankedEntity>,
    pub top_total_co2: Vec<RankedEntity>,
    pub regression: RegressionResult,
}

impl Analysis {
    /// Filter the raw rows, then run the fixed analysis sequence.
    pub fn run(rows: &[RawRow], config: &AnalysisConfig) -> Self {
        let (records, filter_stats) = filter_rows(rows, config.min_year);
        log::info!(
            "Kept {} of {} rows (min year {})",
            filter_stats.rows_kept,
            filter_stats.rows_read,
            config.min_year
        );
        Self::from_records(records, filter_stats, config)
    }

    /// Run the analysis over records that already passed the inclusion filter.
    pub fn from_records(
        records: Vec<EmissionRecord>,
        filter_stats: FilterStats,
        config: &AnalysisConfig,
    ) -> Self {
        let snapshots = latest_per_entity(&records);
        let snapshot_summary = SnapshotSummary {
            co2_per_capita: describe(snapshots.iter().map(|s| s.co2_per_capita)),
            gdp_per_capita: describe(snapshots.iter().map(|s| s.gdp_per_capita)),
        };

        let quartiles = assign_quartiles(&snapshots);
        let quartile_summary = quartile_summary(&snapshots, &quartiles);
        let heatmap = mean_by_year_and_quartile(&records, &quartile_map(&quartiles));

        let global_series = mean_by_date(&records);
        let year_over_year = year_over_year(&global_series);
        let cumulative = cumulative_sum_by_date(&records);
        let total_emissions = total_emissions_by_date(&records);

        let top_co2_per_capita = top_by_co2_per_capita(&snapshots, config.top_n);
        let top_total_co2 = top_by_total_co2(&snapshots, config.top_n);

        let regression = regress_co2_on_gdp(&snapshots);
        match &regression {
            RegressionResult::Fitted(fit) => log::info!(
                "Regression over {} entities: slope {:.3e}, intercept {:.3}, R² {:.3}, p {:.3e}",
                fit.n_observations,
                fit.slope,
                fit.intercept,
                fit.r_squared,
                fit.p_value
            ),
            RegressionResult::Undefined {
                reason,
                n_observations,
            } => log::warn!("Regression undefined over {n_observations} entities: {reason:?}"),
        }

        log::debug!(
            "{} snapshots, {} dates, {} heatmap cells",
            snapshots.len(),
            global_series.len(),
            heatmap.len()
        );

        Analysis {
            config: config.clone(),
            filter_stats,
            records,
            snapshots,
            snapshot_summary,
            quartiles,
            quartile_summary,
            global_series,
            total_emissions,
            heatmap,
            cumulative,
            year_over_year,
            top_co2_per_capita,
            top_total_co2,
            regression,
        }
    }
}
