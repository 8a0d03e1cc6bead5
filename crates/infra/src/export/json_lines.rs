//! One JSON object per row, newline separated.

use std::io::Write;

use tallyscan_inventory::{ExportError, ExportRow, RowExporter};

/// Writes rows as JSON lines to any [`Write`] sink.
#[derive(Debug)]
pub struct JsonLinesExporter<W> {
    out: W,
}

impl<W: Write> JsonLinesExporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowExporter for JsonLinesExporter<W> {
    fn export_rows(&mut self, rows: &[ExportRow]) -> Result<(), ExportError> {
        for row in rows {
            serde_json::to_writer(&mut self.out, row)
                .map_err(|e| ExportError::Failed(format!("failed to serialize row: {e}")))?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_object_per_line() {
        let rows = vec![
            ExportRow {
                location: "A1".to_string(),
                reference: "REF".to_string(),
                lot: "L1".to_string(),
                sub_lot: String::new(),
                quantity: 2,
            },
            ExportRow {
                location: "A1".to_string(),
                reference: "OTHER".to_string(),
                lot: String::new(),
                sub_lot: "00007".to_string(),
                quantity: 1,
            },
        ];
        let mut exporter = JsonLinesExporter::new(Vec::new());
        exporter.export_rows(&rows).unwrap();
        let text = String::from_utf8(exporter.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ExportRow = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, rows[0]);
        assert!(lines[1].contains(r#""SUB-LOT":"00007""#));
    }
}
