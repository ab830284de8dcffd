//! Selection-only view of a sample table.

use std::collections::BTreeSet;

use crate::table::{SampleRow, SampleTable, TableChange};

/// Rows of `source` at `selected`, in selection order. Invalid indices are skipped.
pub fn project(source: &SampleTable, selected: &[usize]) -> SampleTable {
    SampleTable::from_rows(picked(source, selected))
}

fn picked(source: &SampleTable, selected: &[usize]) -> Vec<SampleRow> {
    selected
        .iter()
        .filter_map(|&i| source.row(i).cloned())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing selected; the derived table was cleared.
    NoSelection,
    Projected {
        rows: usize,
        change: Option<TableChange>,
    },
}

/// Keeps a derived table in sync with the current selection.
#[derive(Debug, Default)]
pub struct SelectionProjector {
    derived: SampleTable,
    selected: Vec<usize>,
}

impl SelectionProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn derived(&self) -> &SampleTable {
        &self.derived
    }

    /// Mutable access for subscribing the derived series to change events.
    pub fn derived_mut(&mut self) -> &mut SampleTable {
        &mut self.derived
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Re-project after a selection change.
    pub fn update(&mut self, source: &SampleTable, selected: &[usize]) -> SelectionOutcome {
        self.selected = selected.to_vec();
        self.refresh(source)
    }

    /// Re-project the current selection after `source` changed.
    pub fn refresh(&mut self, source: &SampleTable) -> SelectionOutcome {
        if self.selected.is_empty() {
            if !self.derived.is_empty() {
                self.derived.clear();
            }
            tracing::debug!("no selection");
            return SelectionOutcome::NoSelection;
        }
        let rows = picked(source, &self.selected);
        let count = rows.len();
        let change = self.derived.replace_all(rows);
        SelectionOutcome::Projected {
            rows: count,
            change,
        }
    }

    /// Follow a [`SampleTable::remove`] of `removed` on `source`: removed rows
    /// leave the selection, later rows shift up.
    pub fn rows_removed(
        &mut self,
        source: &SampleTable,
        removed: &BTreeSet<usize>,
    ) -> SelectionOutcome {
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| !removed.contains(&i))
            .map(|&i| i - removed.range(..i).count())
            .collect();
        self.refresh(source)
    }

    pub fn clear(&mut self) -> SelectionOutcome {
        self.selected.clear();
        if !self.derived.is_empty() {
            self.derived.clear();
        }
        SelectionOutcome::NoSelection
    }
}
