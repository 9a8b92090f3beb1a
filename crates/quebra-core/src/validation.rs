//! # Validation Module
//!
//! Business rule validation for operator input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (forms, CLI arguments)                          │
//! │  ├── Type checks (numbers, dates)                                      │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields (Produto, Filial)                                 │
//! │  ├── Price above cost                                                  │
//! │  └── Month range for imports                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Catalog / Ledger mutations                                   │
//! │  └── Key uniqueness, record existence                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator trims its input and returns the value the caller
//! should store.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{PriceEntry, RecordDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Field label shown to the operator for the product name.
pub const FIELD_PRODUCT: &str = "Produto";

/// Field label shown to the operator for the branch.
pub const FIELD_BRANCH: &str = "Filial";

// =============================================================================
// String Validators
// =============================================================================

fn required(value: &str, field: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Validates a product name. Blank → `Produto é obrigatório`.
///
/// ## Example
/// ```rust
/// use quebra_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Coxinha ").unwrap(), "Coxinha");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required(name, FIELD_PRODUCT)
}

/// Validates a branch name. Blank → `Filial é obrigatório`.
pub fn validate_branch(branch: &str) -> ValidationResult<String> {
    required(branch, FIELD_BRANCH)
}

/// Validates a record draft, product first, then branch.
///
/// Returns the draft with trimmed names.
pub fn validate_draft(draft: &RecordDraft) -> ValidationResult<RecordDraft> {
    let product_name = validate_product_name(&draft.product_name)?;
    let branch = validate_branch(&draft.branch)?;
    Ok(RecordDraft {
        product_name,
        branch,
        ..draft.clone()
    })
}

// =============================================================================
// Price Validators
// =============================================================================

/// Validates a catalog entry before it is written.
///
/// ## Rules
/// - Product name is required
/// - Cost and sale price are non-negative
/// - Sale price strictly above cost
///
/// Existing catalog rows are never re-validated; this runs on writes only.
pub fn validate_price_entry(entry: &PriceEntry) -> ValidationResult<PriceEntry> {
    let product_name = validate_product_name(&entry.product_name)?;

    if entry.unit_cost < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: "Custo Unitário".to_string(),
        });
    }
    if entry.unit_sale_price < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: "Preço Venda Unitário".to_string(),
        });
    }
    if entry.unit_sale_price <= entry.unit_cost {
        return Err(ValidationError::PriceNotAboveCost {
            cost: entry.unit_cost.to_string(),
            price: entry.unit_sale_price.to_string(),
        });
    }

    Ok(PriceEntry {
        code: entry.code.trim().to_string(),
        product_name,
        unit_cost: entry.unit_cost,
        unit_sale_price: entry.unit_sale_price,
    })
}

// =============================================================================
// Period Validators
// =============================================================================

/// Validates a calendar month number (1–12).
pub fn validate_month(month: u32) -> ValidationResult<u32> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "Mês".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(month)
}

// =============================================================================
// Unit Tests
// =============================================================================
