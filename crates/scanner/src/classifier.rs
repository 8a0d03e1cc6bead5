//! Scan-string classification (commands vs payload).
//!
//! Comparison is case-insensitive; payload text keeps its original casing.

use tallyscan_core::{DomainError, DomainResult};

/// Prefix-style commands carry their value after a prefix of this many chars.
pub const SET_LOCATION_PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Finish,
    CloseLocation,
    SetLocation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing left after trimming / marker removal.
    Ignored,
    Command(Command),
    /// Location or item candidate; the session phase decides which.
    Payload(String),
}

/// Words a scanner label sheet can print to drive the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandVocabulary {
    finish: Vec<String>,
    close_location: Vec<String>,
    set_location_prefixes: Vec<String>,
}

impl Default for CommandVocabulary {
    fn default() -> Self {
        Self {
            finish: upper(&["FIN", "FIN DE INVENTARIO", "FINISH", "FINISH INVENTORY"]),
            close_location: upper(&[
                "SIGUIENTE",
                "FIN UBI",
                "FIN UBICACION",
                "NEXT",
                "NEXT LOCATION",
                "CLOSE LOCATION",
            ]),
            set_location_prefixes: upper(&["LOC:", "UBI:"]),
        }
    }
}

fn upper(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.trim().to_uppercase()).collect()
}

impl CommandVocabulary {
    /// Build a vocabulary. Every set-location prefix must be exactly
    /// [`SET_LOCATION_PREFIX_LEN`] characters.
    pub fn new(
        finish: &[&str],
        close_location: &[&str],
        set_location_prefixes: &[&str],
    ) -> DomainResult<Self> {
        let prefixes = upper(set_location_prefixes);
        if let Some(bad) = prefixes
            .iter()
            .find(|p| p.chars().count() != SET_LOCATION_PREFIX_LEN)
        {
            return Err(DomainError::validation(format!(
                "set-location prefix {bad:?} must be {SET_LOCATION_PREFIX_LEN} characters"
            )));
        }
        Ok(Self {
            finish: upper(finish),
            close_location: upper(close_location),
            set_location_prefixes: prefixes,
        })
    }

    fn match_command(&self, text: &str) -> Option<Command> {
        let folded = text.to_uppercase();
        if self.finish.iter().any(|w| *w == folded) {
            return Some(Command::Finish);
        }
        if self.close_location.iter().any(|w| *w == folded) {
            return Some(Command::CloseLocation);
        }
        let split = text
            .char_indices()
            .nth(SET_LOCATION_PREFIX_LEN)
            .map_or(text.len(), |(i, _)| i);
        let (head, rest) = text.split_at(split);
        let head = head.to_uppercase();
        self.set_location_prefixes
            .iter()
            .any(|p| *p == head)
            .then(|| Command::SetLocation(rest.trim().to_string()))
    }
}

/// Decides what a scan string is before any GS1 decoding.
#[derive(Debug, Clone)]
pub struct Classifier {
    vocabulary: CommandVocabulary,
    demo_marker: Option<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(CommandVocabulary::default(), Some("DEMO"))
    }
}

impl Classifier {
    /// `demo_marker` is a non-semantic token some test label sheets print in
    /// front of every code; `None` disables stripping.
    pub fn new(vocabulary: CommandVocabulary, demo_marker: Option<&str>) -> Self {
        Self {
            vocabulary,
            demo_marker: demo_marker
                .map(|m| m.trim().to_uppercase())
                .filter(|m| !m.is_empty()),
        }
    }

    pub fn vocabulary(&self) -> &CommandVocabulary {
        &self.vocabulary
    }

    /// Trimmed text with the demo marker removed; empty if nothing remains.
    pub fn strip_marker<'a>(&self, raw: &'a str) -> &'a str {
        let s = raw.trim();
        let Some(marker) = &self.demo_marker else {
            return s;
        };
        let split = s
            .char_indices()
            .nth(marker.chars().count())
            .map_or(s.len(), |(i, _)| i);
        let (head, rest) = s.split_at(split);
        if head.to_uppercase() == *marker {
            rest.trim()
        } else {
            s
        }
    }

    pub fn classify(&self, raw: &str) -> Classification {
        let text = self.strip_marker(raw);
        if text.is_empty() {
            return Classification::Ignored;
        }
        match self.vocabulary.match_command(text) {
            Some(cmd) => Classification::Command(cmd),
            None => Classification::Payload(text.to_string()),
        }
    }
}
