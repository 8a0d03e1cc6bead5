//! Inventory ledger for scan sessions.
//!
//! Lines are keyed by (location, reference, lot, sub-lot). Repeated scans of
//! an item without sub-lot add up; an item with a sub-lot is unique and a
//! second scan of it is rejected. Storage is behind [`LineStore`].

pub mod export;
pub mod ledger;
pub mod line;
pub mod store;

pub use export::{ExportError, ExportRow, RowExporter, rows_from_lines};
pub use ledger::{Ledger, LedgerError, UpsertKind, UpsertOutcome, UpsertRequest};
pub use line::{InventoryLine, KEY_DELIMITER, LineKey};
pub use store::{InMemoryLineStore, LineStore, StoreError};
