//! # Breakage Ledger
//!
//! Ordered, in-memory collection of breakage records and the record
//! lifecycle rules.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Record Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── validate draft → derive metrics → push (new RecordId)          │
//! │                                                                         │
//! │  2. UPDATE                                                             │
//! │     └── validate draft → derive metrics → overwrite in place (same id) │
//! │                                                                         │
//! │  3. DELETE                                                             │
//! │     ├── remove(id)                  single record                      │
//! │     └── remove_matching(range, br)  every record in period + branches │
//! │                                                                         │
//! │  4. APPEND (import)                                                    │
//! │     └── append(records) → pushed after existing rows, no dedup         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Metrics are derived against the catalog at mutation time only: editing
//! a price later never rewrites stored rows.

use std::collections::BTreeSet;

use chrono::Datelike;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::metrics::RecordMetrics;
use crate::types::{BreakageRecord, DateRange, Outcome, RecordDraft, RecordId, Selection, Warning};
use crate::validation::validate_draft;

/// Builds a record from an already validated draft.
///
/// The price is looked up by product name. A missing price is not an
/// error: gross profit stays empty and a [`Warning::MissingPrice`] is
/// returned alongside the record.
pub fn derive_record(id: RecordId, draft: RecordDraft, catalog: &Catalog) -> Outcome<BreakageRecord> {
    let price = catalog.lookup_by_product(&draft.product_name);
    let metrics = RecordMetrics::derive(price, draft.units_sold, draft.units_broken);

    let mut warnings = Vec::new();
    if price.is_none() {
        warnings.push(Warning::MissingPrice {
            product: draft.product_name.clone(),
        });
    }

    let record = BreakageRecord {
        id,
        date: draft.date,
        product_name: draft.product_name,
        units_sold: draft.units_sold,
        units_broken: draft.units_broken,
        breakage_percent: metrics.breakage_percent,
        branch: draft.branch,
        gross_profit: metrics.gross_profit,
    };

    Outcome::with_warnings(record, warnings)
}

/// The breakage ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<BreakageRecord>,
}

impl Ledger {
    pub fn from_records(records: Vec<BreakageRecord>) -> Self {
        Ledger { records }
    }

    pub fn records(&self) -> &[BreakageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&BreakageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates, derives and appends a new record.
    pub fn create(&mut self, draft: RecordDraft, catalog: &Catalog) -> CoreResult<Outcome<BreakageRecord>> {
        let draft = validate_draft(&draft)?;
        let outcome = derive_record(RecordId::new(), draft, catalog);
        self.records.push(outcome.value.clone());
        Ok(outcome)
    }

    /// Re-derives a record from a new draft and overwrites it in place.
    pub fn update(
        &mut self,
        id: RecordId,
        draft: RecordDraft,
        catalog: &Catalog,
    ) -> CoreResult<Outcome<BreakageRecord>> {
        let draft = validate_draft(&draft)?;
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(CoreError::RecordNotFound(id))?;

        let outcome = derive_record(id, draft, catalog);
        *slot = outcome.value.clone();
        Ok(outcome)
    }

    /// Removes one record.
    pub fn remove(&mut self, id: RecordId) -> CoreResult<BreakageRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(CoreError::RecordNotFound(id))?;
        Ok(self.records.remove(index))
    }

    /// Removes every record dated inside `range` for a selected branch.
    ///
    /// Returns the removed records in ledger order.
    pub fn remove_matching(&mut self, range: DateRange, branches: &Selection) -> Vec<BreakageRecord> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| range.contains(r.date) && branches.matches(&r.branch));
        self.records = kept;
        removed
    }

    /// Appends already derived records (import batches).
    pub fn append(&mut self, records: impl IntoIterator<Item = BreakageRecord>) {
        self.records.extend(records);
    }

    // =========================================================================
    // Views for the presentation layer
    // =========================================================================

    /// Records newest first; same-day records keep ledger order.
    pub fn recent_first(&self) -> Vec<&BreakageRecord> {
        let mut records: Vec<&BreakageRecord> = self.records.iter().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    /// First record, newest first, carrying the legacy `date | product | branch` label.
    pub fn find_by_summary(&self, summary: &str) -> Option<&BreakageRecord> {
        self.recent_first()
            .into_iter()
            .find(|r| r.summary() == summary.trim())
    }

    /// Distinct branch names, sorted.
    pub fn branches(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.branch.as_str()))
    }

    /// Distinct product names, sorted.
    pub fn products(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.product_name.as_str()))
    }

    /// Years with at least one record, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.date.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
