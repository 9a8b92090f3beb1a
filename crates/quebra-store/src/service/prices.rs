//! # Price Service
//!
//! Maintenance of the price catalog. Every successful change rewrites the
//! whole catalog file. Existing ledger rows are never recomputed.

use quebra_core::error::CoreError;
use quebra_core::PriceEntry;
use tracing::info;

use crate::error::StoreResult;
use crate::state::AppState;

#[derive(Debug)]
pub struct PriceService<'a> {
    state: &'a mut AppState,
}

impl<'a> PriceService<'a> {
    pub(crate) fn new(state: &'a mut AppState) -> Self {
        PriceService { state }
    }

    /// Inserts or replaces the entry with the same `(code, product)` key.
    ///
    /// Rejected with a validation error when the sale price is not above
    /// the cost; the catalog file is left untouched.
    pub fn upsert(&mut self, entry: PriceEntry) -> StoreResult<PriceEntry> {
        let mut next = self.state.catalog().clone();
        let saved = next.upsert(entry)?;
        self.state.commit_catalog(next)?;

        info!(code = %saved.code, product = %saved.product_name, "Price saved");
        Ok(saved)
    }

    /// Rewrites the first entry of `original_product`.
    pub fn edit(&mut self, original_product: &str, entry: PriceEntry) -> StoreResult<PriceEntry> {
        let mut next = self.state.catalog().clone();
        let saved = next.edit(original_product, entry)?;
        self.state.commit_catalog(next)?;

        info!(original = %original_product, product = %saved.product_name, "Price edited");
        Ok(saved)
    }

    /// Removes every entry of `product_name`, returning how many.
    pub fn delete(&mut self, product_name: &str) -> StoreResult<usize> {
        let mut next = self.state.catalog().clone();
        let removed = next.remove_product(product_name);
        if removed == 0 {
            return Err(CoreError::PriceNotFound(product_name.to_string()).into());
        }
        self.state.commit_catalog(next)?;

        info!(product = %product_name, removed, "Price deleted");
        Ok(removed)
    }

    pub fn list(&self) -> &[PriceEntry] {
        self.state.catalog().entries()
    }
}
