use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which payload shape a decoded item arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// AI segments split by control bytes (GS, RS, ...).
    ControlSeparated,
    /// AI segments split by the `Ê` glyph some firmware substitutes for GS.
    GlyphSeparated,
    /// Human-readable `(AI)value` form.
    Parenthesized,
    /// Flat `01` + GTIN-14 followed by unseparated AIs.
    Concatenated,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::ControlSeparated => "control_separated",
            Encoding::GlyphSeparated => "glyph_separated",
            Encoding::Parenthesized => "parenthesized",
            Encoding::Concatenated => "concatenated",
        }
    }
}

impl core::fmt::Display for Encoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields a strategy extracted from a payload.
///
/// `lot` and `sub_lot` are never `Some("")`: an AI present with an empty value
/// is reported as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFields {
    pub reference: String,
    pub lot: Option<String>,
    pub sub_lot: Option<String>,
}

/// A successfully decoded scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedItem {
    reference: String,
    lot: Option<String>,
    sub_lot: Option<String>,
    raw_input: String,
    encoding: Encoding,
}

impl DecodedItem {
    pub(crate) fn new(fields: DecodedFields, raw_input: &str, encoding: Encoding) -> Self {
        Self {
            reference: fields.reference,
            lot: fields.lot,
            sub_lot: fields.sub_lot,
            raw_input: raw_input.to_string(),
            encoding,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn lot(&self) -> Option<&str> {
        self.lot.as_deref()
    }

    pub fn sub_lot(&self) -> Option<&str> {
        self.sub_lot.as_deref()
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

/// Result of running the decoder chain over one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Decoded(DecodedItem),
    /// No strategy recognized the payload. Callers record the whole scan
    /// string as the reference.
    NotDecodable,
}

impl DecodeOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded(_))
    }

    pub fn into_item(self) -> Option<DecodedItem> {
        match self {
            DecodeOutcome::Decoded(item) => Some(item),
            DecodeOutcome::NotDecodable => None,
        }
    }
}

/// Internal inconsistency inside a strategy (a bug, not a bad payload).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{strategy} decoder fault: {detail}")]
pub struct DecodeFault {
    pub strategy: Encoding,
    pub detail: String,
}

impl DecodeFault {
    pub fn new(strategy: Encoding, detail: impl Into<String>) -> Self {
        Self {
            strategy,
            detail: detail.into(),
        }
    }
}
