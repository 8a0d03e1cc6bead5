//! Tabular export seam.
//!
//! The ledger only produces rows; file formats belong to the exporter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line::InventoryLine;

/// One exported row. Absent lot / sub-lot export as empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "REFERENCE")]
    pub reference: String,
    #[serde(rename = "LOT")]
    pub lot: String,
    #[serde(rename = "SUB-LOT")]
    pub sub_lot: String,
    #[serde(rename = "QUANTITY")]
    pub quantity: u32,
}

impl From<&InventoryLine> for ExportRow {
    fn from(line: &InventoryLine) -> Self {
        Self {
            location: line.location.clone(),
            reference: line.reference.clone(),
            lot: line.lot.clone().unwrap_or_default(),
            sub_lot: line.sub_lot.clone().unwrap_or_default(),
            quantity: line.quantity,
        }
    }
}

pub fn rows_from_lines(lines: &[InventoryLine]) -> Vec<ExportRow> {
    lines.iter().map(ExportRow::from).collect()
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export failed: {0}")]
    Failed(String),
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a downloadable artifact from rows.
pub trait RowExporter {
    fn export_rows(&mut self, rows: &[ExportRow]) -> Result<(), ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn rows_use_spreadsheet_column_names() {
        let mut line = InventoryLine::first_count("A1", "REF", Some("L5"), None, false, Utc::now());
        line.quantity = 3;
        let rows = rows_from_lines(&[line]);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "LOCATION": "A1",
                "REFERENCE": "REF",
                "LOT": "L5",
                "SUB-LOT": "",
                "QUANTITY": 3,
            })
        );
    }
}
