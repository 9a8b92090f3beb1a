//! # quebra-store: Flat-File Storage for Quebra
//!
//! Persistence and operation entry points. The ledger and the catalog are
//! CSV files rewritten whole after every successful mutation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quebra Data Flow                                 │
//! │                                                                         │
//! │  quebra-cli (record add ...)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   quebra-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   AppState    │    │   Services    │    │ Repositories │  │   │
//! │  │   │  (state.rs)   │───►│ records       │───►│ ledger.csv   │  │   │
//! │  │   │ Ledger        │    │ prices        │    │ precos.csv   │  │   │
//! │  │   │ Catalog       │    │ imports       │    │ backups/     │  │   │
//! │  │   │ StoreConfig   │    │ reports       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   spreadsheet.rs (import sources)    export.rs (CSV / XLSX)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  quebra-core (rules, metrics, pivots)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - TOML + environment configuration
//! - [`state`] - Loaded data and the commit points
//! - [`service`] - Record, price, import and report operations
//! - [`repository`] - Ledger and catalog files
//! - [`persist`] - Atomic writes and backups
//! - [`spreadsheet`] - Import source reading
//! - [`export`] - CSV / XLSX export
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quebra_store::{AppState, StoreConfig};
//!
//! let mut state = AppState::open(StoreConfig::load(None)?)?;
//! let outcome = state.imports().import(Path::new("quebras.xlsx"), &batch)?;
//! println!("{} linhas importadas", outcome.value.appended);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod export;
pub mod persist;
pub mod repository;
pub mod service;
pub mod spreadsheet;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StoreConfig;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use export::ExportFormat;
pub use state::AppState;

pub use repository::{CatalogRepository, LedgerRepository};
pub use service::{DeletedRecord, ImportService, ImportSummary, PriceService, RecordService, ReportService};
