//! # quebra-core: Pure Business Logic for Quebra
//!
//! Everything that decides a number or a rule lives here: breakage
//! percentages, gross profit, required fields, catalog and ledger
//! mutations, the import reconciliation stages and the dashboards.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quebra Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    quebra-cli (presentation)                    │   │
//! │  │    record ─ price ─ import ─ report ─ dashboard                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    quebra-store                                 │   │
//! │  │    config, CSV files, spreadsheets, services, AppState          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quebra-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ metrics │ │ catalog │ │ ledger  │ │ import  │ │ report  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO LOGGING SETUP • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PriceEntry, BreakageRecord, Warning, ...)
//! - [`metrics`] - Breakage % and gross profit
//! - [`catalog`] - In-memory price catalog
//! - [`ledger`] - In-memory breakage ledger
//! - [`import`] - Spreadsheet reconciliation
//! - [`report`] - Filtered report and monthly dashboard
//! - [`table`] - Tabular output for display and export
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use quebra_core::{Catalog, PriceEntry};
//! use quebra_core::metrics::{compute_breakage_percent, compute_gross_profit};
//! use rust_decimal::Decimal;
//!
//! let catalog = Catalog::from_entries(vec![PriceEntry::new(
//!     "001",
//!     "Coxinha",
//!     Decimal::new(100, 2),
//!     Decimal::new(250, 2),
//! )]);
//!
//! let price = catalog.lookup_by_product("Coxinha");
//! assert_eq!(compute_breakage_percent(90, 10), Decimal::new(10, 0));
//! assert_eq!(compute_gross_profit(price, 90, 10), Some(Decimal::new(125, 0)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod import;
pub mod ledger;
pub mod metrics;
pub mod report;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, SchemaError, ValidationError};
pub use ledger::Ledger;
pub use metrics::BreakageLevel;
pub use table::{Cell, Table};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Dashboard cells above this breakage percentage are flagged high.
pub const DEFAULT_HIGH_BREAKAGE_THRESHOLD: u32 = 8;

/// Branch given to ledger rows stored without one.
pub const DEFAULT_BRANCH: &str = "Desconhecida";

/// Product name given to catalog rows stored without one.
pub const DEFAULT_PRODUCT: &str = "Desconhecido";
