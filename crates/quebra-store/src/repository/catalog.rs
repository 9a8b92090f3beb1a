//! # Catalog Repository
//!
//! Reads and writes the price catalog file:
//!
//! ```text
//! COD VIP,Produto,Custo Unitário,Preço Venda Unitário
//! 001,Coxinha,1.00,2.50
//! ```
//!
//! Rows are loaded as stored; the price-above-cost rule applies to new
//! writes only. A row with an empty `Produto` loads as `Desconhecido`.

use std::path::{Path, PathBuf};

use quebra_core::{Catalog, PriceEntry, DEFAULT_PRODUCT};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::parse_decimal;
use crate::error::{StoreError, StoreResult};
use crate::persist::write_atomic;

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    #[serde(rename = "COD VIP")]
    code: &'a str,
    #[serde(rename = "Produto")]
    product_name: &'a str,
    #[serde(rename = "Custo Unitário")]
    unit_cost: Decimal,
    #[serde(rename = "Preço Venda Unitário")]
    unit_sale_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct RawCatalogRow {
    #[serde(rename = "COD VIP", default)]
    code: String,
    #[serde(rename = "Produto", default)]
    product_name: String,
    #[serde(rename = "Custo Unitário")]
    unit_cost: String,
    #[serde(rename = "Preço Venda Unitário")]
    unit_sale_price: String,
}

impl RawCatalogRow {
    fn into_entry(self) -> Result<PriceEntry, String> {
        let unit_cost =
            parse_decimal(&self.unit_cost).ok_or_else(|| format!("Custo Unitário inválido '{}'", self.unit_cost))?;
        let unit_sale_price = parse_decimal(&self.unit_sale_price)
            .ok_or_else(|| format!("Preço Venda Unitário inválido '{}'", self.unit_sale_price))?;

        let product_name = match self.product_name.trim() {
            "" => DEFAULT_PRODUCT,
            name => name,
        };

        Ok(PriceEntry::new(self.code.trim(), product_name, unit_cost, unit_sale_price))
    }
}

/// Repository for the price catalog file.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    path: PathBuf,
}

impl CatalogRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CatalogRepository { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole catalog. A missing file is an empty catalog.
    pub fn load(&self) -> StoreResult<Catalog> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Catalog file not found, starting empty");
            return Ok(Catalog::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut entries = Vec::new();
        for row in reader.records() {
            let row = row?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            let line = row.position().map_or(0, |p| p.line());
            let entry = row
                .deserialize::<RawCatalogRow>(Some(&headers))
                .map_err(|e| e.to_string())
                .and_then(RawCatalogRow::into_entry)
                .map_err(|reason| StoreError::Corrupt {
                    path: self.path.clone(),
                    line,
                    reason,
                })?;
            entries.push(entry);
        }

        info!(path = %self.path.display(), count = entries.len(), "Catalog loaded");
        Ok(Catalog::from_entries(entries))
    }

    /// Rewrites the whole catalog file atomically.
    pub fn save(&self, catalog: &Catalog) -> StoreResult<()> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(["COD VIP", "Produto", "Custo Unitário", "Preço Venda Unitário"])?;
        for entry in catalog.entries() {
            writer.serialize(CatalogRow {
                code: &entry.code,
                product_name: &entry.product_name,
                unit_cost: entry.unit_cost,
                unit_sale_price: entry.unit_sale_price,
            })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Csv(csv::Error::from(e.into_error())))?;

        write_atomic(&self.path, &bytes)?;
        info!(path = %self.path.display(), count = catalog.len(), "Catalog saved");
        Ok(())
    }
}
