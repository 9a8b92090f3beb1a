//! # Error Types
//!
//! Domain-specific error types for quebra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quebra-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Missing / invalid operator input               │
//! │  └── SchemaError      - Import source lacks a required column          │
//! │                                                                         │
//! │  quebra-store errors (separate crate)                                  │
//! │  └── StoreError       - File, spreadsheet and config failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → presentation layer   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Messages
//! Validation and schema messages are shown to the operator as-is, so they
//! are written in Portuguese. Everything else is diagnostic.

use thiserror::Error;

use crate::types::RecordId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Operator input failed a business rule. No state was changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The import source is missing a column the pipeline needs.
    ///
    /// ## When This Occurs
    /// - Spreadsheet header row has no `DESCRIÇÃO` column
    /// - Any of `CÓD. VIP`, `QUEBRA`, `VENDA` is absent
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Edit/delete target is not in the ledger.
    #[error("Registro não encontrado: {0}")]
    RecordNotFound(RecordId),

    /// Price edit/delete target is not in the catalog.
    #[error("Produto sem preço cadastrado: {0}")]
    PriceNotFound(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Recoverable: surfaced to the operator, no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} é obrigatório")]
    Required { field: String },

    /// Sale price must strictly exceed unit cost.
    #[error("O Preço Venda Unitário ({price}) deve ser maior que o Custo Unitário ({cost})")]
    PriceNotAboveCost { cost: String, price: String },

    /// Monetary value below zero.
    #[error("{field} não pode ser negativo")]
    Negative { field: String },

    /// Value outside its accepted range (e.g. month 13).
    #[error("{field} deve estar entre {min} e {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Start of a period is after its end.
    #[error("Período inválido: {start} é posterior a {end}")]
    InvalidPeriod { start: String, end: String },

    /// Value could not be read (dates, ids, numbers typed by the operator).
    #[error("{field} inválido: '{value}'")]
    InvalidFormat { field: String, value: String },

    /// Key already taken by another entry.
    #[error("{field} '{value}' já existe")]
    Duplicate { field: String, value: String },

    /// Summing duplicate import rows exceeded the quantity range.
    ///
    /// ## When This Occurs
    /// - Two rows of the same `(code, product)` add up past `u64::MAX`
    #[error("Linha {row}: a soma de {column} excede o limite")]
    QuantityOverflow { row: usize, column: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Schema Error
// =============================================================================

/// Import source structure errors. Aborts the import, nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Header row lacks a required column.
    #[error("A planilha deve conter a coluna '{0}'")]
    MissingColumn(String),

    /// Source has no header row at all.
    #[error("A planilha está vazia")]
    Empty,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
