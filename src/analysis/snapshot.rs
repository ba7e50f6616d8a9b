use std::collections::HashMap;

use crate::data::model::{EmissionRecord, EntityKey, EntitySnapshot};

// ---------------------------------------------------------------------------
// Latest record per entity
// ---------------------------------------------------------------------------

/// Select the most recent record of every (entity_code, entity_name) pair.
///
/// * The snapshot's year is the maximum year among that entity's records.
/// * When several records share the maximum year, the first one in input order wins.
/// * Snapshots come out in first-seen entity order.
pub fn latest_per_entity(records: &[EmissionRecord]) -> Vec<EntitySnapshot> {
    let mut slot_of: HashMap<EntityKey<'_>, usize> = HashMap::new();
    let mut latest: Vec<&EmissionRecord> = Vec::new();

    for record in records {
        match slot_of.get(&record.entity_key()) {
            Some(&slot) => {
                // Strictly greater: an equal year never displaces the earlier row.
                if record.year > latest[slot].year {
                    latest[slot] = record;
                }
            }
            None => {
                slot_of.insert(record.entity_key(), latest.len());
                latest.push(record);
            }
        }
    }

    log::debug!(
        "Selected {} entity snapshots from {} records",
        latest.len(),
        records.len()
    );
    for record in &latest {
        log::trace!("{}: latest year {}", record.entity_key(), record.year);
    }
    latest.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::year_start;

    fn rec(code: &str, name: &str, year: i32, co2pc: f64) -> EmissionRecord {
        EmissionRecord {
            entity_name: name.to_string(),
            entity_code: code.to_string(),
            year,
            date: year_start(year).unwrap(),
            co2_per_capita: co2pc,
            total_co2: None,
            gdp_per_capita: 1_000.0,
        }
    }

    #[test]
    fn test_one_snapshot_per_entity_with_max_year() {
        let records = vec![
            rec("AAA", "Alpha", 1990, 1.0),
            rec("BBB", "Beta", 2005, 2.0),
            rec("AAA", "Alpha", 2010, 3.0),
            rec("BBB", "Beta", 1999, 4.0),
            rec("AAA", "Alpha", 2001, 5.0),
        ];
        let snapshots = latest_per_entity(&records);

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].entity_code, "AAA");
        assert_eq!(snapshots[0].year, 2010);
        assert_eq!(snapshots[0].co2_per_capita, 3.0);
        assert_eq!(snapshots[1].entity_code, "BBB");
        assert_eq!(snapshots[1].year, 2005);
    }

    #[test]
    fn test_tie_on_max_year_keeps_first_in_input_order() {
        let records = vec![
            rec("AAA", "Alpha", 2000, 1.0),
            rec("AAA", "Alpha", 2020, 7.0),
            rec("AAA", "Alpha", 2020, 9.0),
        ];
        let snapshots = latest_per_entity(&records);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].co2_per_capita, 7.0);
    }

    #[test]
    fn test_entities_are_keyed_by_code_and_name() {
        // Aggregates share an empty code but stay distinct by name.
        let records = vec![
            rec("", "World", 2000, 4.0),
            rec("", "Africa", 2000, 1.0),
            rec("", "World", 2001, 4.2),
        ];
        let snapshots = latest_per_entity(&records);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].entity_name, "World");
        assert_eq!(snapshots[0].year, 2001);
        assert_eq!(snapshots[1].entity_name, "Africa");
    }

    #[test]
    fn test_empty_input() {
        assert!(latest_per_entity(&[]).is_empty());
    }
}
