use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keystrokes with a meaning of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Scanner's end-of-code key: flush immediately.
    Terminator,
    /// Drop the last buffered character.
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Control(Control),
}

/// Keys a scanner can be configured to send after each code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminatorKey {
    Enter,
    Tab,
}

impl TerminatorKey {
    fn chars(self) -> &'static [char] {
        match self {
            TerminatorKey::Enter => &['\r', '\n'],
            TerminatorKey::Tab => &['\t'],
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown terminator key: {0:?} (expected `enter` or `tab`)")]
pub struct UnknownTerminatorKey(pub String);

impl FromStr for TerminatorKey {
    type Err = UnknownTerminatorKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enter" | "return" | "cr" | "lf" => Ok(TerminatorKey::Enter),
            "tab" => Ok(TerminatorKey::Tab),
            other => Err(UnknownTerminatorKey(other.to_string())),
        }
    }
}

/// Maps characters of a raw input stream to keystrokes.
///
/// Control bytes that are neither terminators nor backspace (GS `\x1D`, RS,
/// ...) are payload: the decoder uses them as field separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    terminators: Vec<char>,
    backspaces: Vec<char>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_terminators(&[TerminatorKey::Enter, TerminatorKey::Tab])
    }
}

impl KeyMap {
    /// An empty slice means "scanner sends no terminator": only idle
    /// timeouts end a scan.
    pub fn from_terminators(keys: &[TerminatorKey]) -> Self {
        let mut terminators: Vec<char> = keys
            .iter()
            .flat_map(|k| k.chars().iter().copied())
            .collect();
        terminators.dedup();
        Self {
            terminators,
            backspaces: vec!['\x08', '\x7f'],
        }
    }

    pub fn classify(&self, c: char) -> KeyInput {
        if self.terminators.contains(&c) {
            KeyInput::Control(Control::Terminator)
        } else if self.backspaces.contains(&c) {
            KeyInput::Control(Control::Backspace)
        } else {
            KeyInput::Char(c)
        }
    }
}
