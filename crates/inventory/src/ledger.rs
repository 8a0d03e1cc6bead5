//! Aggregate-or-reject rule on top of a [`LineStore`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use tallyscan_core::{Clock, DomainError, LineId};

use crate::line::{InventoryLine, LineKey};
use crate::store::{LineStore, StoreError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// No location is open; nothing can be counted.
    #[error("no active location")]
    NoActiveLocation,

    /// The exact (location, reference, lot, sub-lot) was already counted.
    #[error(
        "duplicate with sub-lot rejected: {reference} / {} / {sub_lot}",
        .lot.as_deref().unwrap_or("-")
    )]
    DuplicateWithSubLot {
        reference: String,
        lot: Option<String>,
        sub_lot: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One count to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertRequest<'a> {
    pub location: Option<&'a str>,
    pub reference: &'a str,
    pub lot: Option<&'a str>,
    pub sub_lot: Option<&'a str>,
    pub manual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Inserted,
    /// Quantity of an existing line went up by one.
    Aggregated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// The line as written.
    pub line: InventoryLine,
    pub kind: UpsertKind,
}

/// Writes counts through to the store. Holds no copy of any line between
/// calls.
pub struct Ledger<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: core::fmt::Debug> core::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger").field("store", &self.store).finish_non_exhaustive()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl<S: LineStore> Ledger<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one unit.
    ///
    /// - sub-lot present: insert, or reject if the key already exists;
    /// - sub-lot absent: bump the existing line's quantity, or insert.
    pub async fn upsert(&self, req: UpsertRequest<'_>) -> Result<UpsertOutcome, LedgerError> {
        let location = present(req.location).ok_or(LedgerError::NoActiveLocation)?;
        let reference = req.reference.trim();
        if reference.is_empty() {
            return Err(DomainError::validation("reference cannot be empty").into());
        }
        let lot = present(req.lot);
        let sub_lot = present(req.sub_lot);

        let key = LineKey::new(location, reference, lot, sub_lot);
        let existing = self.store.find_by_key(&key).await?;
        let now = self.clock.now();

        if let Some(sub_lot) = sub_lot {
            if !existing.is_empty() {
                warn!(%key, "duplicate sub-lot scan rejected");
                return Err(LedgerError::DuplicateWithSubLot {
                    reference: reference.to_string(),
                    lot: lot.map(str::to_string),
                    sub_lot: sub_lot.to_string(),
                });
            }
            let line = InventoryLine::first_count(
                location,
                reference,
                lot,
                Some(sub_lot),
                req.manual,
                now,
            );
            self.store.put(line.clone()).await?;
            info!(%key, id = %line.id, manual = req.manual, "line inserted");
            return Ok(UpsertOutcome {
                line,
                kind: UpsertKind::Inserted,
            });
        }

        if let Some(mut line) = existing.into_iter().next() {
            line.quantity = line
                .quantity
                .checked_add(1)
                .ok_or_else(|| DomainError::quantity_overflow(key.to_string()))?;
            line.last_modified = now;
            line.manual = line.manual || req.manual;
            self.store.put(line.clone()).await?;
            info!(%key, id = %line.id, quantity = line.quantity, "line aggregated");
            return Ok(UpsertOutcome {
                line,
                kind: UpsertKind::Aggregated,
            });
        }

        let line = InventoryLine::first_count(location, reference, lot, None, req.manual, now);
        self.store.put(line.clone()).await?;
        info!(%key, id = %line.id, manual = req.manual, "line inserted");
        Ok(UpsertOutcome {
            line,
            kind: UpsertKind::Inserted,
        })
    }

    pub async fn remove(&self, id: LineId) -> Result<(), LedgerError> {
        self.store.delete(id).await?;
        Ok(())
    }

    pub async fn lines(&self) -> Result<Vec<InventoryLine>, LedgerError> {
        Ok(self.store.get_all().await?)
    }

    pub async fn clear(&self) -> Result<(), LedgerError> {
        self.store.clear().await?;
        Ok(())
    }
}
