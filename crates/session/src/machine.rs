//! Scan routing per session state.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use tallyscan_core::{Clock, SessionState};
use tallyscan_gs1::{DecodeOutcome, Gs1Decoder};
use tallyscan_inventory::{
    InventoryLine, Ledger, LineStore, RowExporter, UpsertKind, UpsertRequest, rows_from_lines,
};
use tallyscan_scanner::{Classification, Classifier, Command, ScanEvent};

use crate::context::{SessionContext, SessionSnapshot};
use crate::error::SessionError;
use crate::outcome::{ExportOutcome, ItemRecorded, ScanOutcome, UndoOutcome};

/// One counting session over one store.
///
/// Operations take `&mut self`, so scans are processed strictly one after
/// another and the context cannot change while a store call is in flight.
pub struct Session<S> {
    ctx: SessionContext,
    classifier: Classifier,
    decoder: Gs1Decoder,
    ledger: Ledger<S>,
}

impl<S: core::fmt::Debug> core::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("ctx", &self.ctx)
            .field("classifier", &self.classifier)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl<S: LineStore> Session<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self::with_parts(Ledger::new(store, clock), Classifier::default(), Gs1Decoder::default())
    }

    pub fn with_parts(ledger: Ledger<S>, classifier: Classifier, decoder: Gs1Decoder) -> Self {
        Self {
            ctx: SessionContext::default(),
            classifier,
            decoder,
            ledger,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn state(&self) -> SessionState {
        self.ctx.state
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub async fn handle_event(&mut self, event: ScanEvent) -> Result<ScanOutcome, SessionError> {
        self.handle_scan(event.text()).await
    }

    pub async fn handle_scan(&mut self, raw: &str) -> Result<ScanOutcome, SessionError> {
        let payload = match self.classifier.classify(raw) {
            Classification::Ignored => return Ok(ScanOutcome::Ignored),
            Classification::Command(cmd) => {
                self.ctx.last_scan = Some(self.classifier.strip_marker(raw).to_string());
                debug!(?cmd, state = %self.ctx.state, "command scanned");
                return match cmd {
                    Command::Finish => self.finish(),
                    Command::CloseLocation => self.close_location(),
                    Command::SetLocation(value) => self.open_location(&value, false),
                };
            }
            Classification::Payload(text) => text,
        };
        self.ctx.last_scan = Some(payload.clone());

        match self.ctx.state {
            SessionState::Finished => {
                self.ctx.state = SessionState::AwaitingLocation;
                self.open_location(&payload, true)
            }
            SessionState::AwaitingLocation => self.open_location(&payload, false),
            SessionState::AwaitingItems => self.record_item(&payload).await,
        }
    }

    /// Closes the current location and stops counting. Lines stay in the
    /// store.
    pub fn finish(&mut self) -> Result<ScanOutcome, SessionError> {
        if self.ctx.state == SessionState::Finished {
            warn!("finish requested while already finished");
            return Ok(ScanOutcome::AlreadyFinished);
        }
        self.ctx.current_location = None;
        self.ctx.state = SessionState::Finished;
        info!("inventory finished");
        Ok(ScanOutcome::Finished)
    }

    pub fn close_location(&mut self) -> Result<ScanOutcome, SessionError> {
        let Some(previous) = self.ctx.current_location.take() else {
            warn!("close location requested with no location open");
            return Ok(ScanOutcome::NothingToClose);
        };
        self.ctx.state = SessionState::AwaitingLocation;
        info!(location = %previous, "location closed");
        Ok(ScanOutcome::LocationClosed { previous })
    }

    /// Deletes the line written by the most recent successful count.
    ///
    /// If that count aggregated into an existing line, the whole line goes.
    pub async fn undo(&mut self) -> Result<UndoOutcome, SessionError> {
        let Some(id) = self.ctx.last_written else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        self.ledger.remove(id).await?;
        self.ctx.last_written = None;
        info!(%id, "last count undone");
        Ok(UndoOutcome::Removed(id))
    }

    /// Deletes every line and returns to the initial context.
    pub async fn reset(&mut self) -> Result<(), SessionError> {
        self.ledger.clear().await?;
        self.ctx = SessionContext::default();
        info!("session reset");
        Ok(())
    }

    /// Counts one typed-in unit at the current location.
    pub async fn manual_entry(
        &mut self,
        reference: &str,
        lot: Option<&str>,
        sub_lot: Option<&str>,
    ) -> Result<ScanOutcome, SessionError> {
        if self.ctx.current_location.is_none() {
            self.ctx.state = SessionState::AwaitingLocation;
            return Err(SessionError::NoActiveLocation);
        }
        if reference.trim().is_empty() {
            return Err(SessionError::ManualReferenceRequired);
        }
        self.upsert(reference, lot, sub_lot, true)
            .await
            .map(|(line, kind)| {
                ScanOutcome::ItemRecorded(ItemRecorded {
                    line,
                    kind,
                    encoding: None,
                    decoder_fault: None,
                })
            })
    }

    pub async fn export(
        &self,
        exporter: &mut dyn RowExporter,
    ) -> Result<ExportOutcome, SessionError> {
        let lines = self.ledger.lines().await?;
        if lines.is_empty() {
            return Ok(ExportOutcome::NothingToExport);
        }
        let rows = rows_from_lines(&lines);
        exporter.export_rows(&rows)?;
        info!(rows = rows.len(), "lines exported");
        Ok(ExportOutcome::Exported { rows: rows.len() })
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let line_count = self.ledger.lines().await?.len();
        Ok(SessionSnapshot {
            state: self.ctx.state,
            current_location: self.ctx.current_location.clone(),
            last_scan: self.ctx.last_scan.clone(),
            line_count,
        })
    }

    fn open_location(&mut self, value: &str, reopened: bool) -> Result<ScanOutcome, SessionError> {
        let location = value.trim();
        if location.is_empty() {
            return Err(SessionError::EmptyLocation);
        }
        self.ctx.current_location = Some(location.to_string());
        self.ctx.state = SessionState::AwaitingItems;
        info!(%location, reopened, "location set");
        Ok(ScanOutcome::LocationSet {
            location: location.to_string(),
            reopened,
        })
    }

    async fn record_item(&mut self, payload: &str) -> Result<ScanOutcome, SessionError> {
        if self.ctx.current_location.is_none() {
            self.ctx.state = SessionState::AwaitingLocation;
            return Err(SessionError::NoActiveLocation);
        }

        let (decoded, decoder_fault) = match self.decoder.decode(payload) {
            Ok(DecodeOutcome::Decoded(item)) => (Some(item), None),
            Ok(DecodeOutcome::NotDecodable) => (None, None),
            Err(fault) => {
                error!(%fault, "decoder fault; storing payload as raw reference");
                (None, Some(fault))
            }
        };

        let encoding = decoded.as_ref().map(|item| item.encoding());
        let result = match &decoded {
            Some(item) => self.upsert(item.reference(), item.lot(), item.sub_lot(), false).await,
            None => self.upsert(payload, None, None, false).await,
        };
        let (line, kind) = result?;
        Ok(ScanOutcome::ItemRecorded(ItemRecorded {
            line,
            kind,
            encoding,
            decoder_fault,
        }))
    }

    async fn upsert(
        &mut self,
        reference: &str,
        lot: Option<&str>,
        sub_lot: Option<&str>,
        manual: bool,
    ) -> Result<(InventoryLine, UpsertKind), SessionError> {
        let req = UpsertRequest {
            location: self.ctx.current_location.as_deref(),
            reference,
            lot,
            sub_lot,
            manual,
        };
        match self.ledger.upsert(req).await {
            Ok(outcome) => {
                self.ctx.last_written = Some(outcome.line.id);
                Ok((outcome.line, outcome.kind))
            }
            Err(err) => {
                let err = SessionError::from(err);
                if matches!(err, SessionError::NoActiveLocation) {
                    self.ctx.state = SessionState::AwaitingLocation;
                }
                Err(err)
            }
        }
    }
}
