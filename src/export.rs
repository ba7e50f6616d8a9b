use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::Analysis;

// ---------------------------------------------------------------------------
// Report export: one JSON document plus one CSV per chart-ready table
// ---------------------------------------------------------------------------

/// Serialize `rows` as CSV with a header row.
pub fn write_table<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_table_file<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.csv"));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_table(file, rows).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Write `report.json` and the per-table CSVs into `dir` (created if needed).
///
/// Returns the paths written.
pub fn write_report(analysis: &Analysis, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let report_path = dir.join("report.json");
    let file = std::fs::File::create(&report_path)
        .with_context(|| format!("creating {}", report_path.display()))?;
    serde_json::to_writer_pretty(file, analysis).context("writing report.json")?;

    let mut written = vec![report_path];
    written.push(write_table_file(dir, "snapshots", &analysis.snapshots)?);
    written.push(write_table_file(dir, "quartiles", &analysis.quartiles)?);
    written.push(write_table_file(dir, "quartile_summary", &analysis.quartile_summary)?);
    written.push(write_table_file(dir, "global_series", &analysis.global_series)?);
    written.push(write_table_file(dir, "total_emissions", &analysis.total_emissions)?);
    written.push(write_table_file(dir, "heatmap", &analysis.heatmap)?);
    written.push(write_table_file(dir, "cumulative", &analysis.cumulative)?);
    written.push(write_table_file(dir, "year_over_year", &analysis.year_over_year)?);
    written.push(write_table_file(dir, "top_co2_per_capita", &analysis.top_co2_per_capita)?);
    written.push(write_table_file(dir, "top_total_co2", &analysis.top_total_co2)?);

    for path in &written {
        log::debug!("Wrote {}", path.display());
    }
    Ok(written)
}
