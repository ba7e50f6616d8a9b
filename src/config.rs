use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::DEFAULT_MIN_YEAR;

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Tunables of the fixed analysis sequence.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "min_year": 1990, "top_n": 15 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Rows before this year are dropped by the inclusion filter.
    pub min_year: i32,
    /// Length of the top-emitter rankings.
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            top_n: 10,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.min_year, 1960);
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = AnalysisConfig::from_json_str(r#"{ "top_n": 3 }"#).unwrap();
        assert_eq!(cfg.min_year, 1960);
        assert_eq!(cfg.top_n, 3);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(AnalysisConfig::from_json_str(r#"{ "minyear": 1990 }"#).is_err());
    }
}
