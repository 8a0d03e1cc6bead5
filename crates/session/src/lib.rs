//! Inventory session state machine.
//!
//! A [`Session`] owns the explicit [`SessionContext`] and routes every scan
//! string through classification, decoding and the ledger according to the
//! current [`SessionState`](tallyscan_core::SessionState).

pub mod context;
pub mod error;
pub mod machine;
pub mod outcome;

pub use context::{SessionContext, SessionSnapshot};
pub use error::SessionError;
pub use machine::Session;
pub use outcome::{ExportOutcome, ItemRecorded, Notice, NoticeLevel, ScanOutcome, UndoOutcome};
