//! # Record Service
//!
//! Create, edit and delete breakage records.
//!
//! Single-record deletes copy the current ledger file into the backup
//! directory before rewriting it. Purges (delete by period and branches)
//! do not, and a purge that matches nothing does not touch the file.

use std::path::PathBuf;

use quebra_core::error::CoreError;
use quebra_core::{BreakageRecord, DateRange, Outcome, RecordDraft, RecordId, Selection};
use serde::Serialize;
use tracing::{debug, info};

use super::log_warnings;
use crate::error::StoreResult;
use crate::persist::backup_file;
use crate::state::AppState;

/// Result of a single-record delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedRecord {
    pub record: BreakageRecord,
    /// Copy of the ledger file taken before the delete.
    pub backup: Option<PathBuf>,
}

/// Record CRUD over the application state.
#[derive(Debug)]
pub struct RecordService<'a> {
    state: &'a mut AppState,
}

impl<'a> RecordService<'a> {
    pub(crate) fn new(state: &'a mut AppState) -> Self {
        RecordService { state }
    }

    /// Adds a record.
    ///
    /// ## Errors
    /// - `Produto é obrigatório` / `Filial é obrigatório`
    /// - persistence failure (record not added)
    ///
    /// A product without price is saved with empty gross profit and a
    /// [`Warning::MissingPrice`](quebra_core::Warning::MissingPrice).
    pub fn create(&mut self, draft: RecordDraft) -> StoreResult<Outcome<BreakageRecord>> {
        let mut next = self.state.ledger().clone();
        let outcome = next.create(draft, self.state.catalog())?;
        self.state.commit_ledger(next)?;

        info!(
            id = %outcome.value.id,
            product = %outcome.value.product_name,
            branch = %outcome.value.branch,
            "Record created"
        );
        log_warnings("record.create", &outcome.warnings);
        Ok(outcome)
    }

    /// Re-derives and overwrites one record, keeping its id and position.
    pub fn update(&mut self, id: RecordId, draft: RecordDraft) -> StoreResult<Outcome<BreakageRecord>> {
        let mut next = self.state.ledger().clone();
        let outcome = next.update(id, draft, self.state.catalog())?;
        self.state.commit_ledger(next)?;

        info!(%id, "Record updated");
        log_warnings("record.update", &outcome.warnings);
        Ok(outcome)
    }

    /// Removes one record after backing up the ledger file.
    pub fn delete(&mut self, id: RecordId) -> StoreResult<DeletedRecord> {
        if self.state.ledger().get(id).is_none() {
            return Err(CoreError::RecordNotFound(id).into());
        }

        let mut next = self.state.ledger().clone();
        let record = next.remove(id)?;

        let config = self.state.config();
        let backup = backup_file(&config.ledger_path(), &config.backup_path())?;
        self.state.commit_ledger(next)?;

        info!(%id, backup = ?backup, "Record deleted");
        Ok(DeletedRecord { record, backup })
    }

    /// Removes every record in `range` belonging to a selected branch.
    ///
    /// Returns how many were removed. Zero matches leaves the file as is.
    pub fn delete_by_filter(&mut self, range: DateRange, branches: &Selection) -> StoreResult<usize> {
        let mut next = self.state.ledger().clone();
        let removed = next.remove_matching(range, branches);

        if removed.is_empty() {
            debug!(start = %range.start(), end = %range.end(), "Purge matched no records");
            return Ok(0);
        }

        self.state.commit_ledger(next)?;
        info!(
            count = removed.len(),
            start = %range.start(),
            end = %range.end(),
            "Records purged"
        );
        Ok(removed.len())
    }

    /// Records newest first, for selection lists.
    pub fn list(&self) -> Vec<BreakageRecord> {
        self.state.ledger().recent_first().into_iter().cloned().collect()
    }

    /// Resolves a legacy `date | product | branch` label to a record id.
    pub fn find_by_summary(&self, summary: &str) -> Option<RecordId> {
        self.state.ledger().find_by_summary(summary).map(|r| r.id)
    }
}
