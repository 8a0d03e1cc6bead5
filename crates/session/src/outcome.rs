//! Results of session operations and their user-facing rendering.

use serde::{Deserialize, Serialize};

use tallyscan_core::LineId;
use tallyscan_gs1::{DecodeFault, Encoding};
use tallyscan_inventory::{InventoryLine, UpsertKind};

use crate::error::SessionError;

/// A successfully recorded count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecorded {
    pub line: InventoryLine,
    pub kind: UpsertKind,
    /// `None` when the payload was stored as a raw reference or typed in.
    pub encoding: Option<Encoding>,
    /// Decoder failure degraded to the raw-reference policy.
    pub decoder_fault: Option<DecodeFault>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Blank input, or only the demo marker.
    Ignored,
    LocationSet {
        location: String,
        /// The scan reopened a finished session.
        reopened: bool,
    },
    LocationClosed {
        previous: String,
    },
    /// Close-location with no location open.
    NothingToClose,
    Finished,
    AlreadyFinished,
    ItemRecorded(ItemRecorded),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    Removed(LineId),
    NothingToUndo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported { rows: usize },
    NothingToExport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Ok,
    Warn,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Ok => "ok",
            NoticeLevel::Warn => "warn",
            NoticeLevel::Error => "error",
        }
    }
}

impl core::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient status-line message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Ok,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// `None` for ignored scans, which produce no feedback.
    pub fn for_scan(result: &Result<ScanOutcome, SessionError>) -> Option<Self> {
        match result {
            Ok(ScanOutcome::Ignored) => None,
            Ok(outcome) => Some(outcome.into()),
            Err(err) => Some(err.into()),
        }
    }
}

impl From<&ScanOutcome> for Notice {
    fn from(outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Ignored => Notice::ok(""),
            ScanOutcome::LocationSet {
                location,
                reopened: false,
            } => Notice::ok(format!("location {location}; scan items")),
            ScanOutcome::LocationSet {
                location,
                reopened: true,
            } => Notice::ok(format!("inventory resumed; location {location}")),
            ScanOutcome::LocationClosed { previous } => {
                Notice::ok(format!("location {previous} closed; scan the next location"))
            }
            ScanOutcome::NothingToClose => Notice::warn("no location is open"),
            ScanOutcome::Finished => Notice::ok("inventory finished; scan a location to resume"),
            ScanOutcome::AlreadyFinished => Notice::warn("inventory is already finished"),
            ScanOutcome::ItemRecorded(item) => {
                let line = &item.line;
                let mut message = format!(
                    "{} {} / {} / {} x{}",
                    match item.kind {
                        UpsertKind::Inserted => "added",
                        UpsertKind::Aggregated => "counted",
                    },
                    line.reference,
                    line.lot.as_deref().unwrap_or("-"),
                    line.sub_lot.as_deref().unwrap_or("-"),
                    line.quantity,
                );
                match &item.decoder_fault {
                    Some(fault) => {
                        message.push_str(&format!(" (stored raw: {fault})"));
                        Notice::warn(message)
                    }
                    None => Notice::ok(message),
                }
            }
        }
    }
}

impl From<&UndoOutcome> for Notice {
    fn from(outcome: &UndoOutcome) -> Self {
        match outcome {
            UndoOutcome::Removed(_) => Notice::ok("last count undone"),
            UndoOutcome::NothingToUndo => Notice::warn("nothing to undo"),
        }
    }
}

impl From<&ExportOutcome> for Notice {
    fn from(outcome: &ExportOutcome) -> Self {
        match outcome {
            ExportOutcome::Exported { rows } => Notice::ok(format!("exported {rows} rows")),
            ExportOutcome::NothingToExport => Notice::warn("nothing to export"),
        }
    }
}

impl From<&SessionError> for Notice {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::EmptyLocation
            | SessionError::NoActiveLocation
            | SessionError::DuplicateWithSubLot { .. }
            | SessionError::ManualReferenceRequired => Notice::warn(err.to_string()),
            SessionError::Domain(_) | SessionError::Store(_) | SessionError::Export(_) => {
                Notice::error(err.to_string())
            }
        }
    }
}
