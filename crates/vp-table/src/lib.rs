//! vp-table: the row model behind the PCA scatter chart.
//!
//! Provides:
//! - [`SampleTable`]: ordered `(label, PC1, PC2)` rows with cached ranges
//! - change notifications ([`TableChange`]) returned from and broadcast by every mutation
//! - tab-separated clipboard copy/paste clipped to the table
//! - [`SelectionProjector`]: a derived table holding only the selected rows

pub mod clipboard;
pub mod selection;
pub mod table;

pub use selection::{SelectionOutcome, SelectionProjector, project};
pub use table::{
    COLUMN_COUNT, CellRange, ChangeKind, Column, SampleRow, SampleTable, SubscriptionId,
    TableChange,
};
