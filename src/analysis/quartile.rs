use std::collections::BTreeMap;

use serde::Serialize;

use super::stats::mean;
use crate::data::model::EntitySnapshot;

// ---------------------------------------------------------------------------
// GDP-per-capita quartiles
// ---------------------------------------------------------------------------

pub const QUARTILE_COUNT: usize = 4;

/// Quartile label of one entity: 1 = lowest GDP per capita, 4 = highest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileAssignment {
    pub entity_name: String,
    pub entity_code: String,
    pub gdp_per_capita: f64,
    pub quartile: u8,
}

/// entity_code → quartile label, used to join records to their entity's bin.
pub type QuartileMap = BTreeMap<String, u8>;

/// Bin index (0-based) for every rank position `0..n`, NTILE style.
///
/// With `base = n / bins` and `extra = n % bins`, the first `extra` bins hold
/// `base + 1` members and the remaining bins hold `base`. When `n < bins`
/// only the first `n` bins are used, one member each.
pub fn ntile(n: usize, bins: usize) -> Vec<usize> {
    if bins == 0 {
        return Vec::new();
    }
    let base = n / bins;
    let extra = n % bins;
    let wide = extra * (base + 1);

    (0..n)
        .map(|rank| {
            if rank < wide {
                rank / (base + 1)
            } else {
                extra + (rank - wide) / base
            }
        })
        .collect()
}

/// Assign every snapshot to a GDP-per-capita quartile.
///
/// Snapshots are ranked by `gdp_per_capita` ascending with a stable sort, so
/// equal values keep their snapshot order. The output is in snapshot order and
/// covers every snapshot exactly once.
pub fn assign_quartiles(snapshots: &[EntitySnapshot]) -> Vec<QuartileAssignment> {
    let mut order: Vec<usize> = (0..snapshots.len()).collect();
    order.sort_by(|&a, &b| {
        snapshots[a]
            .gdp_per_capita
            .total_cmp(&snapshots[b].gdp_per_capita)
    });

    let mut bin_of = vec![0usize; snapshots.len()];
    for (&idx, bin) in order.iter().zip(ntile(snapshots.len(), QUARTILE_COUNT)) {
        bin_of[idx] = bin;
    }

    snapshots
        .iter()
        .zip(bin_of)
        .map(|(s, bin)| QuartileAssignment {
            entity_name: s.entity_name.clone(),
            entity_code: s.entity_code.clone(),
            gdp_per_capita: s.gdp_per_capita,
            quartile: (bin + 1) as u8,
        })
        .collect()
}

/// Build the join map from entity_code to quartile.
///
/// An empty code cannot identify an entity, so such assignments are left out.
/// If two entities share a code the first assignment wins.
pub fn quartile_map(assignments: &[QuartileAssignment]) -> QuartileMap {
    let mut map = QuartileMap::new();
    for a in assignments.iter().filter(|a| !a.entity_code.is_empty()) {
        map.entry(a.entity_code.clone()).or_insert(a.quartile);
    }
    map
}

// ---------------------------------------------------------------------------
// Per-quartile summary over the snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileSummary {
    pub quartile: u8,
    pub entities: usize,
    pub mean_co2_per_capita: Option<f64>,
    pub mean_gdp_per_capita: Option<f64>,
}

/// Entity count and mean indicators of each quartile, quartiles 1 through 4.
///
/// `assignments` must come from [`assign_quartiles`] over the same snapshots.
pub fn quartile_summary(
    snapshots: &[EntitySnapshot],
    assignments: &[QuartileAssignment],
) -> Vec<QuartileSummary> {
    (1..=QUARTILE_COUNT as u8)
        .map(|q| {
            let members: Vec<&EntitySnapshot> = snapshots
                .iter()
                .zip(assignments)
                .filter(|(_, a)| a.quartile == q)
                .map(|(s, _)| s)
                .collect();
            QuartileSummary {
                quartile: q,
                entities: members.len(),
                mean_co2_per_capita: mean(members.iter().map(|s| s.co2_per_capita)),
                mean_gdp_per_capita: mean(members.iter().map(|s| s.gdp_per_capita)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::year_start;

    fn snap(code: &str, gdp_pc: f64) -> EntitySnapshot {
        EntitySnapshot {
            entity_name: format!("Entity {code}"),
            entity_code: code.to_string(),
            year: 2020,
            date: year_start(2020).unwrap(),
            co2_per_capita: gdp_pc / 1_000.0,
            total_co2: None,
            gdp_per_capita: gdp_pc,
        }
    }

    fn bin_sizes(bins: &[usize]) -> [usize; QUARTILE_COUNT] {
        let mut sizes = [0; QUARTILE_COUNT];
        for &b in bins {
            sizes[b] += 1;
        }
        sizes
    }

    #[test]
    fn test_ntile_first_bins_take_the_remainder() {
        assert_eq!(ntile(8, 4), vec![0, 0, 1, 1, 2, 2, 3, 3]);
        assert_eq!(ntile(5, 4), vec![0, 0, 1, 2, 3]);
        assert_eq!(ntile(7, 4), vec![0, 0, 1, 1, 2, 2, 3]);
        assert_eq!(ntile(3, 4), vec![0, 1, 2]);
        assert!(ntile(0, 4).is_empty());
    }

    #[test]
    fn test_ntile_sizes_differ_by_at_most_one() {
        for n in 0..60 {
            let sizes = bin_sizes(&ntile(n, QUARTILE_COUNT));
            let max = *sizes.iter().max().unwrap();
            let min = *sizes.iter().min().unwrap();
            assert!(max - min <= 1, "n = {n}: sizes {sizes:?}");
            assert_eq!(sizes.iter().sum::<usize>(), n);
        }
    }

    #[test]
    fn test_assign_quartiles_follows_gdp_rank() {
        let snapshots = vec![
            snap("D", 40_000.0),
            snap("A", 1_000.0),
            snap("C", 20_000.0),
            snap("B", 5_000.0),
        ];
        let assignments = assign_quartiles(&snapshots);
        let labels: Vec<(&str, u8)> = assignments
            .iter()
            .map(|a| (a.entity_code.as_str(), a.quartile))
            .collect();
        assert_eq!(labels, vec![("D", 4), ("A", 1), ("C", 3), ("B", 2)]);
    }

    #[test]
    fn test_ties_keep_snapshot_order() {
        let snapshots = vec![
            snap("X", 10.0),
            snap("Y", 10.0),
            snap("Z", 10.0),
            snap("W", 10.0),
            snap("V", 10.0),
        ];
        let quartiles: Vec<u8> = assign_quartiles(&snapshots)
            .iter()
            .map(|a| a.quartile)
            .collect();
        assert_eq!(quartiles, vec![1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let snapshots: Vec<EntitySnapshot> = (0..23)
            .map(|i| snap(&format!("E{i:02}"), ((i * 7919) % 31) as f64))
            .collect();
        assert_eq!(assign_quartiles(&snapshots), assign_quartiles(&snapshots));
    }

    #[test]
    fn test_quartile_map_skips_empty_codes() {
        let snapshots = vec![snap("AAA", 1.0), snap("", 2.0), snap("BBB", 3.0)];
        let map = quartile_map(&assign_quartiles(&snapshots));
        assert_eq!(map.len(), 2);
        assert_eq!(map["AAA"], 1);
        assert_eq!(map["BBB"], 3);
    }

    #[test]
    fn test_quartile_summary() {
        let snapshots = vec![
            snap("A", 1_000.0),
            snap("B", 3_000.0),
            snap("C", 5_000.0),
            snap("D", 7_000.0),
            snap("E", 9_000.0),
        ];
        let assignments = assign_quartiles(&snapshots);
        let summary = quartile_summary(&snapshots, &assignments);

        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].entities, 2);
        assert_eq!(summary[0].mean_gdp_per_capita, Some(2_000.0));
        assert_eq!(summary[3].entities, 1);
        assert_eq!(summary[3].mean_co2_per_capita, Some(9.0));
    }
}
