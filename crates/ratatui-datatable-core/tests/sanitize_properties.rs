//! Property tests for record sanitizing and row selection.
//!
//! Properties:
//! - output identities are unique
//! - every surviving record has exactly the schema keys, in schema order
//! - the first record claiming an identity is the one that survives
//! - sanitizing sanitized output changes nothing
//! - the selection never holds a row the tracker does not know

use proptest::prelude::*;
use ratatui_datatable_core::Column;
use ratatui_datatable_core::ColumnSchema;
use ratatui_datatable_core::KeyMatch;
use ratatui_datatable_core::Record;
use ratatui_datatable_core::RecordId;
use ratatui_datatable_core::Sanitizer;
use ratatui_datatable_core::SelectionTracker;
use ratatui_datatable_core::sanitize::sanitize;
use std::collections::HashSet;

const KEYS: [&str; 4] = ["id", "name", "age", "city"];

fn schema() -> ColumnSchema {
    KEYS.iter().map(|k| Column::new(*k, k.to_uppercase())).collect()
}

/// A record over a random subset of the schema keys (plus maybe a stray key), in random order.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::option::weighted(0.9, 0i64..6),
        prop::sample::select(vec!["Ann", "Bob", "Cy"]),
        0i64..100,
        prop::sample::select(vec!["Oslo", "Rome"]),
        prop::collection::vec(any::<bool>(), 3),
        any::<bool>(),
        0usize..24,
    )
        .prop_map(|(id, name, age, city, keep, stray, perm)| {
            let mut fields: Vec<(&str, ratatui_datatable_core::Value)> = Vec::new();
            if let Some(id) = id {
                fields.push(("id", id.into()));
            }
            if keep[0] {
                fields.push(("name", name.into()));
            }
            if keep[1] {
                fields.push(("age", age.into()));
            }
            if keep[2] {
                fields.push(("city", city.into()));
            }
            if stray {
                fields.push(("extra", "x".into()));
            }
            permute(&mut fields, perm);
            fields.into_iter().collect()
        })
}

// Mostly identity order, so a fair share of records conform.
fn permute<T>(items: &mut [T], perm: usize) {
    if perm < 12 || items.len() < 2 {
        return;
    }
    let n = items.len();
    items.swap(perm % n, (perm / n) % n);
}

fn ids(rows: &[ratatui_datatable_core::Row]) -> Vec<RecordId> {
    rows.iter().map(|r| r.id().clone()).collect()
}

proptest! {
    #[test]
    fn output_ids_are_unique(records in prop::collection::vec(arb_record(), 0..40)) {
        let rows = sanitize(&records, &schema());
        let unique: HashSet<_> = rows.iter().map(|r| r.id().clone()).collect();
        prop_assert_eq!(unique.len(), rows.len());
    }

    #[test]
    fn survivors_match_schema_exactly(records in prop::collection::vec(arb_record(), 0..40)) {
        let schema = schema();
        for key_match in [KeyMatch::Exact, KeyMatch::AnyOrder] {
            let rows = Sanitizer::new(key_match).sanitize(&records, &schema);
            for row in &rows {
                prop_assert!(row.record().keys().eq(schema.keys()));
            }
        }
    }

    #[test]
    fn first_claim_survives(records in prop::collection::vec(arb_record(), 0..40)) {
        let rows = sanitize(&records, &schema());
        for row in &rows {
            let first = records
                .iter()
                .find(|r| r.explicit_id().as_ref() == Some(row.id()));
            prop_assert_eq!(first, Some(row.record()));
        }
    }

    #[test]
    fn sanitizing_twice_changes_nothing(records in prop::collection::vec(arb_record(), 0..40)) {
        let schema = schema();
        let once = sanitize(&records, &schema);
        let again_input: Vec<Record> = once.iter().map(|r| r.record().clone()).collect();
        let twice = sanitize(&again_input, &schema);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn selection_stays_within_known_rows(
        first in prop::collection::vec(arb_record(), 0..30),
        second in prop::collection::vec(arb_record(), 0..30),
        picks in prop::collection::vec(0usize..30, 0..20),
    ) {
        let schema = schema();
        let rows = sanitize(&first, &schema);
        let mut tracker = SelectionTracker::new();
        tracker.set_rows(&rows);
        for &i in &picks {
            if let Some(row) = rows.get(i) {
                tracker.toggle_one(row);
            }
        }

        let next = sanitize(&second, &schema);
        tracker.set_rows(&next);
        let known: HashSet<_> = next.iter().map(|r| r.id().clone()).collect();
        prop_assert!(tracker.selected().iter().all(|r| known.contains(r.id())));

        // Rows from the previous sequence that are gone are ignored.
        for row in &rows {
            if !known.contains(row.id()) {
                prop_assert!(!tracker.toggle_one(row));
            }
        }
    }

    #[test]
    fn toggle_twice_is_identity(
        records in prop::collection::vec(arb_record(), 1..30),
        picks in prop::collection::vec(0usize..30, 0..10),
        target in 0usize..30,
    ) {
        let rows = sanitize(&records, &schema());
        prop_assume!(!rows.is_empty());
        let mut tracker = SelectionTracker::new();
        tracker.set_rows(&rows);
        for &i in &picks {
            tracker.toggle_one(&rows[i % rows.len()]);
        }
        let before = ids(tracker.selected());
        let row = &rows[target % rows.len()];
        let was_selected = tracker.is_selected(row.id());
        tracker.toggle_one(row);
        prop_assert_ne!(tracker.is_selected(row.id()), was_selected);
        tracker.toggle_one(row);
        let after = ids(tracker.selected());
        if was_selected {
            // A re-selected row moves to the end.
            let mut expected: Vec<_> = before.iter().filter(|id| *id != row.id()).cloned().collect();
            expected.push(row.id().clone());
            prop_assert_eq!(after, expected);
        } else {
            prop_assert_eq!(after, before);
        }
    }
}
