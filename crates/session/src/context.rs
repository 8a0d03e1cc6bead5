use serde::{Deserialize, Serialize};

use tallyscan_core::{LineId, SessionState};

/// Mutable session state, owned by one [`Session`](crate::Session).
///
/// Only the state machine writes to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub(crate) state: SessionState,
    pub(crate) current_location: Option<String>,
    /// Undo pointer: the line written by the most recent successful count.
    pub(crate) last_written: Option<LineId>,
    pub(crate) last_scan: Option<String>,
}

impl SessionContext {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_location(&self) -> Option<&str> {
        self.current_location.as_deref()
    }

    pub fn last_written(&self) -> Option<LineId> {
        self.last_written
    }

    pub fn last_scan(&self) -> Option<&str> {
        self.last_scan.as_deref()
    }
}

/// Read-only view for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub current_location: Option<String>,
    pub last_scan: Option<String>,
    pub line_count: usize,
}
