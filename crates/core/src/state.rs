//! Session phase shared by the input assembler and the state machine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Next non-command scan names a location.
    #[default]
    AwaitingLocation,
    /// Scans are items for the current location.
    AwaitingItems,
    /// Inventory closed; the next non-command scan re-opens it.
    Finished,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::AwaitingLocation => "awaiting_location",
            SessionState::AwaitingItems => "awaiting_items",
            SessionState::Finished => "finished",
        }
    }
}

impl core::fmt::Display for SessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
