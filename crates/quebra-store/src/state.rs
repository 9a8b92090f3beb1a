//! # Application State
//!
//! The loaded catalog and ledger plus the repositories backing them.
//!
//! ## Mutation Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Read-Modify-Write, One Operation                     │
//! │                                                                         │
//! │  1. clone the in-memory Ledger / Catalog                               │
//! │  2. apply the quebra-core mutation to the clone                        │
//! │       └── Err → nothing written, memory untouched                     │
//! │  3. repository.save(clone)   (temp file + rename)                      │
//! │       └── Err → memory untouched, file untouched                      │
//! │  4. clone becomes the in-memory state                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single writer: two processes sharing the same files can overwrite each
//! other's changes.
//!
//! ## Usage
//! ```rust,ignore
//! let mut state = AppState::open(StoreConfig::load(None)?)?;
//! let outcome = state.records().create(draft)?;
//! let dashboard = state.reports().dashboard(&filter);
//! ```

use quebra_core::{Catalog, Ledger};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::repository::{CatalogRepository, LedgerRepository};
use crate::service::{ImportService, PriceService, RecordService, ReportService};

/// Everything one operator session works on.
#[derive(Debug)]
pub struct AppState {
    config: StoreConfig,
    ledger_repo: LedgerRepository,
    catalog_repo: CatalogRepository,
    ledger: Ledger,
    catalog: Catalog,
}

impl AppState {
    /// Validates the config and loads both files.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let ledger_repo = LedgerRepository::new(config.ledger_path());
        let catalog_repo = CatalogRepository::new(config.catalog_path());
        let ledger = ledger_repo.load()?;
        let catalog = catalog_repo.load()?;

        info!(
            records = ledger.len(),
            prices = catalog.len(),
            data_dir = %config.data_dir.display(),
            "Application state loaded"
        );

        Ok(AppState {
            config,
            ledger_repo,
            catalog_repo,
            ledger,
            catalog,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Record create/edit/delete.
    pub fn records(&mut self) -> RecordService<'_> {
        RecordService::new(self)
    }

    /// Price catalog maintenance.
    pub fn prices(&mut self) -> PriceService<'_> {
        PriceService::new(self)
    }

    /// Spreadsheet import.
    pub fn imports(&mut self) -> ImportService<'_> {
        ImportService::new(self)
    }

    /// Read-only reports and selector sources.
    pub fn reports(&self) -> ReportService<'_> {
        ReportService::new(self)
    }

    // =========================================================================
    // Commit points
    // =========================================================================

    /// Persists `next` and makes it the current ledger.
    pub(crate) fn commit_ledger(&mut self, next: Ledger) -> StoreResult<()> {
        self.ledger_repo.save(&next)?;
        self.ledger = next;
        Ok(())
    }

    /// Persists `next` and makes it the current catalog.
    pub(crate) fn commit_catalog(&mut self, next: Catalog) -> StoreResult<()> {
        self.catalog_repo.save(&next)?;
        self.catalog = next;
        Ok(())
    }
}
