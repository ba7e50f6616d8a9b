use serde::Serialize;

use crate::data::model::EntitySnapshot;

/// One row of a top-emitter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntity {
    /// 1-based.
    pub rank: usize,
    pub entity_name: String,
    pub entity_code: String,
    pub year: i32,
    pub value: f64,
}

/// The `n` snapshots with the highest value of `metric`, descending.
///
/// Snapshots where `metric` is `None` are skipped; equal values keep snapshot order.
pub fn top_by<F>(snapshots: &[EntitySnapshot], n: usize, metric: F) -> Vec<RankedEntity>
where
    F: Fn(&EntitySnapshot) -> Option<f64>,
{
    let mut scored: Vec<(&EntitySnapshot, f64)> = snapshots
        .iter()
        .filter_map(|s| metric(s).filter(|v| v.is_finite()).map(|v| (s, v)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (s, value))| RankedEntity {
            rank: i + 1,
            entity_name: s.entity_name.clone(),
            entity_code: s.entity_code.clone(),
            year: s.year,
            value,
        })
        .collect()
}

/// Highest emitters per person in their latest year.
pub fn top_by_co2_per_capita(snapshots: &[EntitySnapshot], n: usize) -> Vec<RankedEntity> {
    top_by(snapshots, n, |s| Some(s.co2_per_capita))
}

/// Highest total emitters (Mt) in their latest year.
pub fn top_by_total_co2(snapshots: &[EntitySnapshot], n: usize) -> Vec<RankedEntity> {
    top_by(snapshots, n, |s| s.total_co2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::year_start;

    fn snap(code: &str, co2pc: f64, total: Option<f64>) -> EntitySnapshot {
        EntitySnapshot {
            entity_name: code.to_string(),
            entity_code: code.to_string(),
            year: 2022,
            date: year_start(2022).unwrap(),
            co2_per_capita: co2pc,
            total_co2: total,
            gdp_per_capita: 1.0,
        }
    }

    #[test]
    fn test_top_by_co2_per_capita_descending() {
        let snapshots = vec![
            snap("A", 2.0, None),
            snap("B", 9.0, None),
            snap("C", 5.0, None),
            snap("D", 9.0, None),
        ];
        let top = top_by_co2_per_capita(&snapshots, 3);
        let codes: Vec<&str> = top.iter().map(|r| r.entity_code.as_str()).collect();
        assert_eq!(codes, vec!["B", "D", "C"]);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[2].rank, 3);
    }

    #[test]
    fn test_top_by_total_skips_missing() {
        let snapshots = vec![
            snap("A", 1.0, Some(10.0)),
            snap("B", 1.0, None),
            snap("C", 1.0, Some(300.0)),
        ];
        let top = top_by_total_co2(&snapshots, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].entity_code, "C");
        assert_eq!(top[0].value, 300.0);
    }
}
