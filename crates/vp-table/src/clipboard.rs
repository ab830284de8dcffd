//! Tab-separated clipboard interchange.
//!
//! Copy writes one line per row (each terminated by `\n`) with cells joined by
//! tabs. Paste writes a block starting at an anchor cell, clipped to the
//! existing rows and columns; it never grows the table.

use crate::table::{COLUMN_COUNT, CellRange, ChangeKind, SampleTable, TableChange};

impl SampleTable {
    /// Render `range` (clipped to the table) as tab-separated text.
    pub fn copy(&self, range: CellRange) -> String {
        if self.is_empty() || range.left >= COLUMN_COUNT {
            return String::new();
        }
        let bottom = range.bottom.min(self.len() - 1);
        let right = range.right.min(COLUMN_COUNT - 1);

        let mut out = String::new();
        for row in range.top..=bottom {
            let cells: Vec<String> = (range.left..=right)
                .filter_map(|col| self.cell_text(row, col))
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Paste tab-separated `text` with its first cell at `(anchor_row, anchor_col)`.
    ///
    /// Cells falling outside the table are dropped, as are numeric cells that do
    /// not parse. Returns one combined change covering the written cells.
    pub fn paste(&mut self, anchor_row: usize, anchor_col: usize, text: &str) -> Option<TableChange> {
        let mut last_row = None;
        let mut last_col = None;

        for (i, line) in text.lines().enumerate() {
            let row = anchor_row + i;
            if row >= self.len() {
                break;
            }
            for (j, cell) in line.split('\t').enumerate() {
                let col = anchor_col + j;
                if col >= COLUMN_COUNT {
                    break;
                }
                if self.write_cell(row, col, cell) {
                    last_row = last_row.max(Some(row));
                    last_col = last_col.max(Some(col));
                }
            }
        }

        let range = CellRange::new(anchor_row, anchor_col, last_row?, last_col?);
        self.emit(ChangeKind::Edited, Some(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SampleRow;

    fn table() -> SampleTable {
        SampleTable::from_rows(vec![
            SampleRow::new("a", 1.5, -2.0),
            SampleRow::new("b", 3.0, 4.25),
            SampleRow::new("c", 0.0, 0.5),
        ])
    }

    #[test]
    fn copy_rectangle() {
        let t = table();
        assert_eq!(t.copy(CellRange::new(0, 0, 1, 2)), "a\t1.5\t-2\nb\t3\t4.25\n");
        assert_eq!(t.copy(CellRange::new(1, 1, 2, 1)), "3\n0\n");
    }

    #[test]
    fn copy_clips_to_table() {
        let t = table();
        assert_eq!(t.copy(CellRange::new(2, 0, 10, 10)), "c\t0\t0.5\n");
        assert_eq!(SampleTable::new().copy(CellRange::new(0, 0, 1, 1)), "");
    }

    #[test]
    fn paste_overwrites_block() {
        let mut t = table();
        let change = t.paste(1, 1, "9\t8\n7\t6\n").unwrap();
        assert_eq!(change.kind, ChangeKind::Edited);
        assert_eq!(change.range, Some(CellRange::new(1, 1, 2, 2)));
        assert_eq!(t.row(1).unwrap(), &SampleRow::new("b", 9.0, 8.0));
        assert_eq!(t.row(2).unwrap(), &SampleRow::new("c", 7.0, 6.0));
    }

    #[test]
    fn paste_never_adds_rows_or_columns() {
        let mut t = table();
        let change = t.paste(2, 1, "1\t2\t3\t4\n5\t6\n").unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.row(2).unwrap(), &SampleRow::new("c", 1.0, 2.0));
        assert_eq!(change.range, Some(CellRange::new(2, 1, 2, 2)));
    }

    #[test]
    fn paste_skips_bad_numbers() {
        let mut t = table();
        t.paste(0, 0, "x\tnope\t7\r\n").unwrap();
        assert_eq!(t.row(0).unwrap(), &SampleRow::new("x", 1.5, 7.0));
    }

    #[test]
    fn paste_outside_table_is_a_no_op() {
        let mut t = table();
        assert!(t.paste(5, 0, "z\t1\t1\n").is_none());
        assert!(t.paste(0, 3, "z\n").is_none());
    }

    #[test]
    fn copy_then_paste_moves_values() {
        let mut t = table();
        let text = t.copy(CellRange::new(0, 1, 0, 2));
        t.paste(2, 1, &text).unwrap();
        assert_eq!(t.row(2).unwrap().pc1, 1.5);
        assert_eq!(t.row(2).unwrap().pc2, -2.0);
    }
}
