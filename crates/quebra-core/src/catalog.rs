//! # Price Catalog
//!
//! In-memory mapping from `(code, product name)` to unit cost and sale price.
//!
//! The catalog only mutates itself; `quebra-store` rewrites the whole
//! catalog file after every successful mutation.
//!
//! ## Code Matching
//! Supplier codes come from two places: the catalog file (typed by an
//! operator) and import spreadsheets (often numeric cells). `"001"`, `"1"`
//! and `1.0` all name the same product code, so codes are compared through
//! [`normalize_code`].

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::PriceEntry;
use crate::validation::{validate_price_entry, ValidationResult};

/// Canonical form of a supplier code.
///
/// Integral numbers lose leading zeros and trailing decimals, anything else
/// is only trimmed.
///
/// ## Example
/// ```rust
/// use quebra_core::catalog::normalize_code;
///
/// assert_eq!(normalize_code(" 001 "), "1");
/// assert_eq!(normalize_code("1.0"), "1");
/// assert_eq!(normalize_code("SLG-7"), "SLG-7");
/// ```
pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    match Decimal::from_str(code) {
        Ok(number) if number.fract().is_zero() => number.trunc().normalize().to_string(),
        _ => code.to_string(),
    }
}

/// True when both codes normalize to the same value.
pub fn codes_match(left: &str, right: &str) -> bool {
    left.trim() == right.trim() || normalize_code(left) == normalize_code(right)
}

/// The price catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<PriceEntry>,
}

impl Catalog {
    /// Wraps entries loaded from storage without re-validating them.
    pub fn from_entries(entries: Vec<PriceEntry>) -> Self {
        Catalog { entries }
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// First entry priced for this product name, whatever its code.
    pub fn lookup_by_product(&self, product_name: &str) -> Option<&PriceEntry> {
        self.entries.iter().find(|e| e.product_name == product_name)
    }

    /// Entry stored under exactly this key (codes compared normalized).
    pub fn lookup_by_code_and_product(&self, code: &str, product_name: &str) -> Option<&PriceEntry> {
        self.entries.iter().find(|e| e.has_key(code, product_name))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts or replaces the entry stored under the same key.
    ///
    /// Fails without touching the catalog when the sale price is not above
    /// the cost.
    pub fn upsert(&mut self, entry: PriceEntry) -> ValidationResult<PriceEntry> {
        let entry = validate_price_entry(&entry)?;

        match self
            .entries
            .iter_mut()
            .find(|e| e.has_key(&entry.code, &entry.product_name))
        {
            Some(existing) => *existing = entry.clone(),
            None => self.entries.push(entry.clone()),
        }

        Ok(entry)
    }

    /// Rewrites the first entry priced for `original_product`.
    ///
    /// Code and name may change, as long as the new key is not already
    /// used by another entry.
    pub fn edit(&mut self, original_product: &str, entry: PriceEntry) -> CoreResult<PriceEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.product_name == original_product)
            .ok_or_else(|| CoreError::PriceNotFound(original_product.to_string()))?;

        let entry = validate_price_entry(&entry)?;

        let clash = self
            .entries
            .iter()
            .enumerate()
            .any(|(i, e)| i != index && e.has_key(&entry.code, &entry.product_name));
        if clash {
            return Err(ValidationError::Duplicate {
                field: "Produto".to_string(),
                value: format!("{} / {}", entry.code, entry.product_name),
            }
            .into());
        }

        self.entries[index] = entry.clone();
        Ok(entry)
    }

    /// Removes every entry priced for this product name.
    ///
    /// Returns how many entries were removed.
    pub fn remove_product(&mut self, product_name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.product_name != product_name);
        before - self.entries.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
