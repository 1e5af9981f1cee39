//! # Duplicate-Tenancy Detection
//!
//! Identifier drift between the two systems can yield several charge
//! rows for what is physically one tenancy. Grouping is therefore
//! coarser than the selection identity: `property|unit|tenant`,
//! without the property identifier. Within each group only the
//! highest-amount row survives for submission; every member is marked
//! so the duplicate group can be surfaced to a reviewer.

use std::collections::{HashMap, HashSet};

use crate::model::ChargeRow;

/// Result of duplicate detection, keyed by [`ChargeRow::row_id`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DuplicateSets {
    /// Rows excluded from submission (every duplicate except the
    /// highest-amount member of its group).
    pub excluded_ids: HashSet<String>,
    /// Every row belonging to any duplicate group, kept members
    /// included.
    pub group_ids: HashSet<String>,
}

/// Partition charge rows into duplicate groups and mark exclusions.
///
/// Zero- and negative-amount rows are not actionable and never count
/// as duplicates. Within a group, rows sort descending by amount;
/// the sort is stable, so equal amounts keep their input order and
/// the earliest-built row wins the tie.
pub fn compute_duplicates(rows: &[ChargeRow]) -> DuplicateSets {
    let mut groups: HashMap<String, Vec<&ChargeRow>> = HashMap::new();

    for row in rows {
        if row.amount <= 0.0 {
            continue;
        }
        let key = format!(
            "{}|{}|{}",
            row.property_name, row.unit_name, row.tenant_name
        );
        groups.entry(key).or_default().push(row);
    }

    let mut sets = DuplicateSets::default();
    for mut members in groups.into_values() {
        if members.len() < 2 {
            continue;
        }
        members.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        for (i, member) in members.iter().enumerate() {
            let id = member.row_id();
            if i > 0 {
                sets.excluded_ids.insert(id.clone());
            }
            sets.group_ids.insert(id);
        }
    }

    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(prop: &str, unit: &str, tenant: &str, prop_id: &str, amount: f64) -> ChargeRow {
        ChargeRow {
            property_name: prop.into(),
            unit_name: unit.into(),
            tenant_name: tenant.into(),
            v2_property_id: prop_id.into(),
            amount,
            ..ChargeRow::default()
        }
    }

    #[test]
    fn highest_amount_kept_rest_excluded() {
        let rows = vec![
            row("Elm", "1A", "Jane Doe", "p1", 20.0),
            row("Elm", "1A", "Jane Doe", "p2", 50.0),
            row("Elm", "1A", "Jane Doe", "p3", 30.0),
        ];
        let sets = compute_duplicates(&rows);

        assert_eq!(sets.group_ids.len(), 3);
        assert_eq!(sets.excluded_ids.len(), 2);
        assert!(!sets.excluded_ids.contains(&rows[1].row_id()));
        assert!(sets.excluded_ids.contains(&rows[0].row_id()));
        assert!(sets.excluded_ids.contains(&rows[2].row_id()));
    }

    #[test]
    fn singletons_are_not_groups() {
        let rows = vec![
            row("Elm", "1A", "Jane Doe", "p1", 20.0),
            row("Elm", "2B", "John Roe", "p1", 20.0),
        ];
        let sets = compute_duplicates(&rows);
        assert!(sets.group_ids.is_empty());
        assert!(sets.excluded_ids.is_empty());
    }

    #[test]
    fn zero_amount_rows_never_count_as_duplicates() {
        let rows = vec![
            row("Elm", "1A", "Jane Doe", "p1", 0.0),
            row("Elm", "1A", "Jane Doe", "p2", 25.0),
        ];
        let sets = compute_duplicates(&rows);
        assert!(sets.group_ids.is_empty());
    }

    #[test]
    fn grouping_ignores_property_identifier() {
        // Same tenancy surfaced under two property IDs still groups.
        let rows = vec![
            row("Elm", "1A", "Jane Doe", "p1", 25.0),
            row("Elm", "1A", "Jane Doe", "p2", 40.0),
        ];
        let sets = compute_duplicates(&rows);
        assert_eq!(sets.group_ids.len(), 2);
        assert!(sets.excluded_ids.contains(&rows[0].row_id()));
    }

    #[test]
    fn equal_amounts_keep_input_order() {
        let rows = vec![
            row("Elm", "1A", "Jane Doe", "p1", 25.0),
            row("Elm", "1A", "Jane Doe", "p2", 25.0),
        ];
        let sets = compute_duplicates(&rows);
        assert!(!sets.excluded_ids.contains(&rows[0].row_id()));
        assert!(sets.excluded_ids.contains(&rows[1].row_id()));
    }
}
