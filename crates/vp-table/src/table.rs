//! Sample table model.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use vp_core::{Bounds, parse_real};

/// One plotted sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub label: String,
    pub pc1: f64,
    pub pc2: f64,
}

impl SampleRow {
    pub fn new(label: impl Into<String>, pc1: f64, pc2: f64) -> Self {
        Self {
            label: label.into(),
            pc1,
            pc2,
        }
    }
}

pub const COLUMN_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Label,
    Pc1,
    Pc2,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [Column::Label, Column::Pc1, Column::Pc2];

    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Column::Label => 0,
            Column::Pc1 => 1,
            Column::Pc2 => 2,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Label => "label",
            Column::Pc1 => "PC1",
            Column::Pc2 => "PC2",
        }
    }
}

/// Inclusive rectangular cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl CellRange {
    pub fn new(top: usize, left: usize, bottom: usize, right: usize) -> Self {
        Self {
            top: top.min(bottom),
            left: left.min(right),
            bottom: top.max(bottom),
            right: left.max(right),
        }
    }

    pub fn rows(top: usize, bottom: usize) -> Self {
        Self::new(top, 0, bottom, COLUMN_COUNT - 1)
    }

    pub fn contains_row(&self, row: usize) -> bool {
        (self.top..=self.bottom).contains(&row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Removed,
    Edited,
    /// Whole contents replaced.
    Reset,
}

/// Notification emitted after every mutation.
///
/// Carries what changed, not the new values: consumers re-read the table.
/// `range` is `None` only for a reset that left the table empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub kind: ChangeKind,
    pub range: Option<CellRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&TableChange)>;

/// Ordered `(label, PC1, PC2)` rows.
///
/// Row indices are positional; removing rows renumbers the ones after them.
#[derive(Default)]
pub struct SampleTable {
    rows: Vec<SampleRow>,
    bounds: OnceCell<Option<Bounds>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
}

impl fmt::Debug for SampleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleTable")
            .field("rows", &self.rows)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<SampleRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&SampleRow> {
        self.rows.get(index)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows.iter().map(|r| (r.pc1, r.pc2))
    }

    /// Display text of a cell; numbers use the shortest round-trip form.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        let r = self.rows.get(row)?;
        Some(match Column::from_index(col)? {
            Column::Label => r.label.clone(),
            Column::Pc1 => r.pc1.to_string(),
            Column::Pc2 => r.pc2.to_string(),
        })
    }

    /// `(xmin, xmax, ymin, ymax)` over PC1/PC2, `None` when the table is empty.
    ///
    /// Cached until the next mutation.
    pub fn range_bounds(&self) -> Option<Bounds> {
        *self.bounds.get_or_init(|| Bounds::from_points(self.points()))
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&TableChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn append(&mut self, row: SampleRow) -> Option<TableChange> {
        self.rows.push(row);
        let last = self.rows.len() - 1;
        self.emit(ChangeKind::Inserted, Some(CellRange::rows(last, last)))
    }

    /// Remove rows by index. Out-of-range indices are ignored.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Option<TableChange> {
        let old_len = self.rows.len();
        let valid: Vec<usize> = indices.range(..old_len).copied().collect();
        let first = *valid.first()?;

        let mut position = 0;
        self.rows.retain(|_| {
            let keep = valid.binary_search(&position).is_err();
            position += 1;
            keep
        });

        // Every row from the first removed one onwards moved or vanished.
        self.emit(ChangeKind::Removed, Some(CellRange::rows(first, old_len - 1)))
    }

    /// Edit one cell from text. Unknown columns, missing rows and unparsable
    /// numbers leave the table untouched and return `None`.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> Option<TableChange> {
        if !self.write_cell(row, col, value) {
            return None;
        }
        self.emit(ChangeKind::Edited, Some(CellRange::new(row, col, row, col)))
    }

    /// Replace the whole contents in one step.
    pub fn replace_all(&mut self, rows: Vec<SampleRow>) -> Option<TableChange> {
        self.rows = rows;
        let range = (!self.rows.is_empty()).then(|| CellRange::rows(0, self.rows.len() - 1));
        self.emit(ChangeKind::Reset, range)
    }

    pub fn clear(&mut self) -> Option<TableChange> {
        self.replace_all(Vec::new())
    }

    pub(crate) fn write_cell(&mut self, row: usize, col: usize, value: &str) -> bool {
        let Some(column) = Column::from_index(col) else {
            return false;
        };
        let Some(r) = self.rows.get_mut(row) else {
            return false;
        };
        match column {
            Column::Label => r.label = value.to_string(),
            Column::Pc1 | Column::Pc2 => {
                let Ok(v) = parse_real(value, "table cell") else {
                    tracing::debug!(row, col, value, "ignoring non-numeric cell value");
                    return false;
                };
                if column == Column::Pc1 {
                    r.pc1 = v;
                } else {
                    r.pc2 = v;
                }
            }
        }
        true
    }

    pub(crate) fn emit(&mut self, kind: ChangeKind, range: Option<CellRange>) -> Option<TableChange> {
        self.bounds = OnceCell::new();
        let change = TableChange { kind, range };
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn abc() -> SampleTable {
        SampleTable::from_rows(vec![
            SampleRow::new("a", 0.0, 1.0),
            SampleRow::new("b", 10.0, -1.0),
            SampleRow::new("c", 5.0, 4.0),
        ])
    }

    #[test]
    fn bounds_of_empty_table() {
        assert_eq!(SampleTable::new().range_bounds(), None);
    }

    #[test]
    fn bounds_track_mutations() {
        let mut t = abc();
        assert_eq!(t.range_bounds(), Some(Bounds::new(0.0, 10.0, -1.0, 4.0)));
        t.set_cell(1, 1, "20");
        assert_eq!(t.range_bounds(), Some(Bounds::new(0.0, 20.0, -1.0, 4.0)));
        t.remove(&BTreeSet::from([1]));
        assert_eq!(t.range_bounds(), Some(Bounds::new(0.0, 5.0, 1.0, 4.0)));
    }

    #[test]
    fn append_reports_new_row() {
        let mut t = abc();
        let change = t.append(SampleRow::default()).unwrap();
        assert_eq!(change.kind, ChangeKind::Inserted);
        assert_eq!(change.range, Some(CellRange::rows(3, 3)));
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn remove_renumbers_and_ignores_invalid() {
        let mut t = abc();
        let change = t.remove(&BTreeSet::from([0, 2, 99])).unwrap();
        assert_eq!(t.labels().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(change.range, Some(CellRange::rows(0, 2)));
    }

    #[test]
    fn remove_nothing_valid_is_a_no_op() {
        let mut t = abc();
        assert!(t.remove(&BTreeSet::from([7])).is_none());
        assert!(t.remove(&BTreeSet::new()).is_none());
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn set_cell_validates_column_and_value() {
        let mut t = abc();
        assert!(t.set_cell(0, 3, "x").is_none());
        assert!(t.set_cell(5, 0, "x").is_none());
        assert!(t.set_cell(0, 2, "not a number").is_none());
        assert_eq!(t.row(0).unwrap().pc2, 1.0);

        let change = t.set_cell(0, 0, "renamed").unwrap();
        assert_eq!(change.range, Some(CellRange::new(0, 0, 0, 0)));
        assert_eq!(t.row(0).unwrap().label, "renamed");
        t.set_cell(2, 2, "-3.5").unwrap();
        assert_eq!(t.row(2).unwrap().pc2, -3.5);
    }

    #[test]
    fn reset_of_empty_table_has_no_range() {
        let mut t = abc();
        let change = t.clear().unwrap();
        assert_eq!(change.kind, ChangeKind::Reset);
        assert_eq!(change.range, None);
    }

    #[test]
    fn listeners_see_every_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut t = abc();
        let id = t.subscribe(move |c| sink.borrow_mut().push(c.kind));

        t.append(SampleRow::default());
        t.set_cell(0, 1, "2");
        t.set_cell(0, 1, "bad");
        t.remove(&BTreeSet::from([0]));
        t.replace_all(vec![SampleRow::default()]);
        assert_eq!(
            *seen.borrow(),
            vec![
                ChangeKind::Inserted,
                ChangeKind::Edited,
                ChangeKind::Removed,
                ChangeKind::Reset
            ]
        );

        assert!(t.unsubscribe(id));
        t.clear();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn column_mapping() {
        assert_eq!(Column::from_index(1), Some(Column::Pc1));
        assert_eq!(Column::from_index(3), None);
        assert_eq!(Column::Pc2.index(), 2);
        assert_eq!(Column::Label.header(), "label");
    }
}
