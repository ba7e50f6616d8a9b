//! CO2 emissions vs. GDP analysis.
//!
//! Loads a country-year emissions table, keeps the rows with usable per-capita
//! emissions and GDP, and derives the chart-ready tables of one fixed analysis:
//! global mean series, GDP-quartile heatmap, cumulative and year-over-year
//! series, top emitters and an OLS fit of emissions on GDP per capita.

pub mod analysis;
pub mod config;
pub mod data;
pub mod export;
pub mod pipeline;

pub use config::AnalysisConfig;
pub use data::error::LoadError;
pub use data::model::{EmissionRecord, EntitySnapshot, RawRow};
pub use pipeline::Analysis;
