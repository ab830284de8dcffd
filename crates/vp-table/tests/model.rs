//! Integration tests for the table model as a chart binding would drive it.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use vp_core::Bounds;
use vp_table::{
    CellRange, ChangeKind, SampleRow, SampleTable, SelectionOutcome, SelectionProjector, project,
};

fn coins() -> SampleTable {
    SampleTable::from_rows(vec![
        SampleRow::new("denarius", -3.0, 0.5),
        SampleRow::new("solidus", 2.0, 1.5),
        SampleRow::new("follis", 0.5, -4.0),
        SampleRow::new("aureus", 6.0, 2.0),
    ])
}

#[test]
fn chart_binding_repulls_after_each_event() {
    let mut table = coins();
    let pulls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pulls);
    table.subscribe(move |change| sink.borrow_mut().push(change.range));

    table.paste(0, 1, "1\t1\n").unwrap();
    table.remove(&BTreeSet::from([3])).unwrap();

    let seen = pulls.borrow();
    assert_eq!(seen[0], Some(CellRange::new(0, 1, 0, 2)));
    assert_eq!(seen[1], Some(CellRange::rows(3, 3)));
    assert_eq!(table.range_bounds(), Some(Bounds::new(0.5, 2.0, -4.0, 1.5)));
}

#[test]
fn selection_projection_tracks_selection_changes() {
    let table = coins();
    let mut projector = SelectionProjector::new();

    let outcome = projector.update(&table, &[3, 1]);
    assert!(matches!(outcome, SelectionOutcome::Projected { rows: 2, change: Some(c) } if c.kind == ChangeKind::Reset));
    assert_eq!(
        projector.derived().labels().collect::<Vec<_>>(),
        vec!["aureus", "solidus"]
    );

    assert_eq!(projector.update(&table, &[]), SelectionOutcome::NoSelection);
    assert!(projector.derived().is_empty());
}

#[test]
fn project_two_then_zero() {
    let derived = project(&coins(), &[2, 0]);
    assert_eq!(derived.len(), 2);
    assert_eq!(derived.row(0).unwrap().label, "follis");
    assert_eq!(derived.row(1).unwrap().label, "denarius");
}

#[test]
fn copied_block_pastes_into_another_table() {
    let source = coins();
    let mut target = SampleTable::from_rows(vec![SampleRow::default(); 2]);
    let text = source.copy(CellRange::new(1, 0, 3, 2));
    target.paste(0, 0, &text).unwrap();

    // Only two rows fit.
    assert_eq!(target.len(), 2);
    assert_eq!(target.row(0).unwrap(), &SampleRow::new("solidus", 2.0, 1.5));
    assert_eq!(target.row(1).unwrap(), &SampleRow::new("follis", 0.5, -4.0));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn cell() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{0,6}",
            (-1e6..1e6f64).prop_map(|v| v.to_string()),
        ]
    }

    fn block() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::collection::vec(cell(), 1..5), 0..7).prop_map(|rows| {
            rows.iter()
                .map(|cells| cells.join("\t"))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    proptest! {
        #[test]
        fn paste_never_grows_the_table(row in 0usize..6, col in 0usize..4, text in block()) {
            let mut table = coins();
            let before = table.len();
            let change = table.paste(row, col, &text);
            prop_assert_eq!(table.len(), before);
            if let Some(range) = change.and_then(|c| c.range) {
                prop_assert!(range.bottom < table.len());
                prop_assert!(range.right < 3);
            }
        }

        #[test]
        fn selection_survives_removal(
            selected in prop::collection::vec(0usize..4, 0..4),
            removed in prop::collection::btree_set(0usize..4, 0..4),
        ) {
            let mut table = coins();
            let mut projector = SelectionProjector::new();
            projector.update(&table, &selected);
            let kept: Vec<String> = selected
                .iter()
                .filter(|&&i| !removed.contains(&i))
                .map(|&i| table.row(i).unwrap().label.clone())
                .collect();

            table.remove(&removed);
            projector.rows_removed(&table, &removed);

            let derived: Vec<String> = projector.derived().labels().map(str::to_string).collect();
            prop_assert_eq!(derived, kept);
        }
    }
}
