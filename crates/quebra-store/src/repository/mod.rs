//! # Repository Module
//!
//! Flat-file repositories for the two persisted collections.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (records, prices, import)                                     │
//! │       │                                                                 │
//! │       │  repo.save(&ledger)                                            │
//! │       ▼                                                                 │
//! │  LedgerRepository / CatalogRepository                                  │
//! │  ├── load(&self)   whole file → Ledger / Catalog                       │
//! │  └── save(&self)   Ledger / Catalog → whole file (atomic)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dados_quebras.csv / precos.csv                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no append-only log: every save rewrites the whole file, and
//! the last writer wins.
//!
//! ## Available Repositories
//!
//! - [`LedgerRepository`] - Breakage records
//! - [`CatalogRepository`] - Price entries

pub mod catalog;
pub mod ledger;

pub use catalog::CatalogRepository;
pub use ledger::LedgerRepository;

use std::str::FromStr;

use rust_decimal::Decimal;

/// Reads a decimal written either plainly or in scientific notation.
pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// True for cells a spreadsheet tool writes for "no value".
pub(crate) fn is_blank(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("none")
}
