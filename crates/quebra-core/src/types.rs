//! # Domain Types
//!
//! Core domain types used throughout Quebra.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌────────────────┐   │
//! │  │   PriceEntry    │   │   BreakageRecord     │   │    Warning     │   │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ────────────  │   │
//! │  │  code           │   │  id (UUID)           │   │  MissingPrice  │   │
//! │  │  product_name   │   │  date                │   │  Unpriced...   │   │
//! │  │  unit_cost      │   │  product_name ───────┼──►│  Quantity...   │   │
//! │  │  unit_sale_price│◄──┤  units_sold/broken   │   │  RowSkipped    │   │
//! │  └─────────────────┘   │  breakage_percent    │   └────────────────┘   │
//! │     lookup by name,    │  branch              │                        │
//! │     never a reference  │  gross_profit (opt)  │                        │
//! │                        └──────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Price entries are keyed by `(code, product_name)`. Breakage records carry
//! a UUID assigned at creation, so two records with the same date, product
//! and branch are still told apart.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;

// =============================================================================
// Record Identifier
// =============================================================================

/// Stable surrogate identifier of a ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct RecordId(#[ts(as = "String")] Uuid);

impl RecordId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::required("ID"));
        }
        Uuid::parse_str(s)
            .map(RecordId)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "ID".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Price Entry
// =============================================================================

/// Unit cost and sale price of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceEntry {
    /// Supplier code ("COD VIP"). May be blank for manually added products.
    pub code: String,

    /// Product name, unique together with `code`.
    pub product_name: String,

    #[ts(as = "String")]
    pub unit_cost: Decimal,

    #[ts(as = "String")]
    pub unit_sale_price: Decimal,
}

impl PriceEntry {
    pub fn new(
        code: impl Into<String>,
        product_name: impl Into<String>,
        unit_cost: Decimal,
        unit_sale_price: Decimal,
    ) -> Self {
        PriceEntry {
            code: code.into(),
            product_name: product_name.into(),
            unit_cost,
            unit_sale_price,
        }
    }

    /// True when this entry is stored under the given key.
    pub fn has_key(&self, code: &str, product_name: &str) -> bool {
        crate::catalog::codes_match(&self.code, code) && self.product_name == product_name
    }
}

// =============================================================================
// Breakage Record
// =============================================================================

/// One day/branch/product breakage observation with its derived metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BreakageRecord {
    pub id: RecordId,

    #[ts(as = "String")]
    pub date: NaiveDate,

    pub product_name: String,

    pub units_sold: u64,

    pub units_broken: u64,

    /// `broken / (sold + broken) × 100`, 2 decimals.
    #[ts(as = "String")]
    pub breakage_percent: Decimal,

    pub branch: String,

    /// `None` when the product had no catalog price at computation time.
    #[ts(as = "Option<String>")]
    pub gross_profit: Option<Decimal>,
}

impl BreakageRecord {
    /// Human-readable label `date | product | branch`.
    ///
    /// Not unique: several records may share it. Use [`BreakageRecord::id`]
    /// to address a record.
    pub fn summary(&self) -> String {
        format!("{} | {} | {}", self.date, self.product_name, self.branch)
    }
}

/// Operator input for creating or editing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecordDraft {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub product_name: String,
    pub units_sold: u64,
    pub units_broken: u64,
    pub branch: String,
}

// =============================================================================
// Warnings
// =============================================================================

/// Non-fatal notice attached to a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Warning {
    /// Record saved without gross profit because the product has no price.
    MissingPrice { product: String },

    /// Import rows dropped because their product has no catalog price.
    UnpricedProductsSkipped { products: Vec<String> },

    /// Import quantity could not be read and was replaced by 0.
    QuantityCoerced {
        row: usize,
        column: String,
        raw: String,
    },

    /// Import row ignored entirely.
    RowSkipped { row: usize, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingPrice { product } => write!(
                f,
                "Produto {product} sem preço cadastrado. Lucro Bruto ficará vazio."
            ),
            Warning::UnpricedProductsSkipped { products } => write!(
                f,
                "Os seguintes produtos estão sem preço cadastrado e não foram importados: {}",
                products.join(", ")
            ),
            Warning::QuantityCoerced { row, column, raw } => write!(
                f,
                "Linha {row}: valor '{raw}' em {column} não é uma quantidade válida, usado 0"
            ),
            Warning::RowSkipped { row, reason } => write!(f, "Linha {row} ignorada: {reason}"),
        }
    }
}

/// A successful result plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Outcome { value, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Multi-select filter over branch or product names.
///
/// `Only` with an empty set matches nothing, the same as an operator
/// clearing every option in a multi-select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Fails when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
