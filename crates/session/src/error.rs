use thiserror::Error;

use tallyscan_core::DomainError;
use tallyscan_inventory::{ExportError, LedgerError, StoreError};

/// Per-scan failures. None of them ends the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("location is empty; scan the location again")]
    EmptyLocation,

    /// The session was moved back to awaiting-location.
    #[error("no active location; scan a location first")]
    NoActiveLocation,

    #[error(
        "duplicate with sub-lot rejected: {reference} / {} / {sub_lot}",
        .lot.as_deref().unwrap_or("-")
    )]
    DuplicateWithSubLot {
        reference: String,
        lot: Option<String>,
        sub_lot: String,
    },

    #[error("reference is required for a manual entry")]
    ManualReferenceRequired,

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Surfaced verbatim; the scan was not committed and can be repeated.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<LedgerError> for SessionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NoActiveLocation => SessionError::NoActiveLocation,
            LedgerError::DuplicateWithSubLot {
                reference,
                lot,
                sub_lot,
            } => SessionError::DuplicateWithSubLot {
                reference,
                lot,
                sub_lot,
            },
            LedgerError::Domain(e) => SessionError::Domain(e),
            LedgerError::Store(e) => SessionError::Store(e),
        }
    }
}
