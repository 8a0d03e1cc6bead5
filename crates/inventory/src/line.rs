use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tallyscan_core::LineId;

/// Field delimiter inside a [`LineKey`] (ASCII unit separator).
///
/// Key fields have their control characters escaped, so this can never
/// appear inside a field.
pub const KEY_DELIMITER: char = '\u{1F}';

/// Lookup key of an inventory line.
///
/// `UPPER(location) ␟ UPPER(reference) ␟ lot ␟ sub_lot`, each field trimmed.
/// Location and reference compare case-insensitively; lot and sub-lot are
/// taken as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineKey(String);

impl LineKey {
    pub fn new(location: &str, reference: &str, lot: Option<&str>, sub_lot: Option<&str>) -> Self {
        let fields = [
            key_field(location).to_uppercase(),
            key_field(reference).to_uppercase(),
            key_field(lot.unwrap_or_default()),
            key_field(sub_lot.unwrap_or_default()),
        ];
        let mut key = String::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                key.push(KEY_DELIMITER);
            }
            key.push_str(field);
        }
        Self(key)
    }

    /// Rebuild from a stored key string (storage adapters only).
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LineKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0.replace(KEY_DELIMITER, "|"))
    }
}

/// Trimmed field with control characters written as `\xHH` and backslashes
/// doubled, so distinct fields never share a key form.
fn key_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// One row of the inventory: how many units of an item were counted at a
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub id: LineId,
    pub key: LineKey,
    pub location: String,
    pub reference: String,
    pub lot: Option<String>,
    pub sub_lot: Option<String>,
    /// Always >= 1.
    pub quantity: u32,
    /// Entered by hand rather than scanned (sticky once set).
    pub manual: bool,
    pub last_modified: DateTime<Utc>,
}

impl InventoryLine {
    /// A fresh line with quantity 1.
    pub fn first_count(
        location: &str,
        reference: &str,
        lot: Option<&str>,
        sub_lot: Option<&str>,
        manual: bool,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LineId::new(),
            key: LineKey::new(location, reference, lot, sub_lot),
            location: location.trim().to_string(),
            reference: reference.trim().to_string(),
            lot: lot.map(str::to_string),
            sub_lot: sub_lot.map(str::to_string),
            quantity: 1,
            manual,
            last_modified: at,
        }
    }

    pub fn has_sub_lot(&self) -> bool {
        self.sub_lot.as_deref().is_some_and(|s| !s.is_empty())
    }
}
