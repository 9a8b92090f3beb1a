//! # Import Service
//!
//! Stages 1, 2 and 10 of the import around the pure reconciliation in
//! [`quebra_core::import`]:
//!
//! ```text
//! branch non-empty? ──► file exists? ──► read_sheet ──► plan_import ──┐
//!                                                                     │
//!            ┌──── plan empty: report 0, ledger file untouched ◄──────┤
//!            │                                                        │
//!            └──── append batch, save ledger ◄────────────────────────┘
//! ```

use std::path::Path;

use quebra_core::import::{plan_import, ImportBatch};
use quebra_core::validation::validate_branch;
use quebra_core::Outcome;
use serde::Serialize;
use tracing::info;

use super::log_warnings;
use crate::error::{StoreError, StoreResult};
use crate::spreadsheet::read_sheet;
use crate::state::AppState;

/// What an import did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Records appended to the ledger.
    pub appended: usize,
    /// Distinct unpriced products left out, in source order.
    pub skipped_products: Vec<String>,
    /// Non-blank data rows in the source.
    pub source_rows: usize,
    /// Rows after summing duplicate `(code, product)` pairs.
    pub aggregated_rows: usize,
}

#[derive(Debug)]
pub struct ImportService<'a> {
    state: &'a mut AppState,
}

impl<'a> ImportService<'a> {
    pub(crate) fn new(state: &'a mut AppState) -> Self {
        ImportService { state }
    }

    /// Imports a breakage spreadsheet for one branch and month.
    ///
    /// Importing the same file twice appends it twice.
    ///
    /// ## Errors
    /// - blank branch, month outside 1..=12, missing file (validation)
    /// - header without `CÓD. VIP`, `DESCRIÇÃO`, `QUEBRA` or `VENDA` (schema)
    /// - ledger write failure (persistence; nothing appended)
    pub fn import(&mut self, source: &Path, batch: &ImportBatch) -> StoreResult<Outcome<ImportSummary>> {
        validate_branch(&batch.branch)?;
        if !source.exists() {
            return Err(StoreError::SourceMissing(source.to_path_buf()));
        }

        let sheet = read_sheet(source)?;
        let plan = plan_import(&sheet, batch, self.state.catalog())?;
        let warnings = plan.all_warnings();

        let summary = ImportSummary {
            appended: plan.records.len(),
            skipped_products: plan.skipped_products.clone(),
            source_rows: plan.source_rows,
            aggregated_rows: plan.aggregated_rows,
        };

        if plan.is_empty() {
            info!(source = %source.display(), "Import produced no priced rows, ledger unchanged");
        } else {
            let mut next = self.state.ledger().clone();
            next.append(plan.records);
            self.state.commit_ledger(next)?;

            info!(
                source = %source.display(),
                branch = %batch.branch,
                month = batch.month,
                year = batch.year,
                appended = summary.appended,
                skipped = summary.skipped_products.len(),
                "Import appended to ledger"
            );
        }

        log_warnings("import", &warnings);
        Ok(Outcome::with_warnings(summary, warnings))
    }
}
