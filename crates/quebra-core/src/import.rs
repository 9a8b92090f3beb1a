//! # Import Reconciliation
//!
//! Pure stages of the spreadsheet import. The store reads the file into a
//! [`RawSheet`]; everything from header matching to the final records
//! happens here without I/O.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Import Pipeline                                  │
//! │                                                                         │
//! │  RawSheet (headers + string cells)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ColumnMap::resolve      CÓD. VIP / DESCRIÇÃO / QUEBRA / VENDA         │
//! │       │                  (trim, case and accent insensitive)           │
//! │       ▼                                                                 │
//! │  project_rows            quantities → u64, bad values → 0 + warning    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  aggregate               Σ per (code, product), first-seen order       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_import             % quebra, day 1 of month, branch,             │
//! │                          join catalog by (code, product),              │
//! │                          unpriced rows → skipped list,                 │
//! │                          gross profit for the rest                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Importing the same sheet twice yields two batches: there is no dedup
//! against what the ledger already holds.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{normalize_code, Catalog};
use crate::error::{CoreResult, SchemaError, ValidationError};
use crate::metrics::{compute_breakage_percent, compute_gross_profit};
use crate::types::{BreakageRecord, RecordId, Warning};
use crate::validation::{validate_branch, validate_month};

/// Source column holding the supplier code.
pub const COL_CODE: &str = "CÓD. VIP";
/// Source column holding the product description.
pub const COL_DESCRIPTION: &str = "DESCRIÇÃO";
/// Source column holding broken units.
pub const COL_BROKEN: &str = "QUEBRA";
/// Source column holding sold units.
pub const COL_SOLD: &str = "VENDA";

// =============================================================================
// Raw input
// =============================================================================

/// Spreadsheet content reduced to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Spreadsheet line number of a data row (header is line 1).
    pub fn line_number(index: usize) -> usize {
        index + 2
    }
}

/// Canonical header used for matching.
///
/// Trims, collapses inner whitespace, uppercases and drops Portuguese
/// accents, so `" cód.  vip"` and `"COD. VIP"` match `CÓD. VIP`.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .flat_map(char::to_uppercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ç' => 'C',
        other => other,
    }
}

// =============================================================================
// Stage 2: column resolution
// =============================================================================

/// Positions of the four columns the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub code: usize,
    pub description: usize,
    pub broken: usize,
    pub sold: usize,
}

impl ColumnMap {
    /// Locates the required columns. The description column is checked first.
    pub fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SchemaError::Empty);
        }

        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |name: &str| -> Result<usize, SchemaError> {
            let wanted = normalize_header(name);
            normalized
                .iter()
                .position(|h| *h == wanted)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
        };

        let description = find(COL_DESCRIPTION)?;
        Ok(ColumnMap {
            code: find(COL_CODE)?,
            description,
            broken: find(COL_BROKEN)?,
            sold: find(COL_SOLD)?,
        })
    }
}

// =============================================================================
// Stages 3-4: projection and numeric coercion
// =============================================================================

/// One projected source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// Spreadsheet line number, for warnings.
    pub line: usize,
    pub code: String,
    pub product_name: String,
    pub units_broken: u64,
    pub units_sold: u64,
}

/// Reads a quantity cell.
///
/// Blank cells count as 0. Anything that is not a non-negative whole number
/// returns `None` so the caller can record the substitution.
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }

    let number = Decimal::from_str(raw).ok().or_else(|| {
        // Brazilian decimal comma ("12,0")
        if raw.contains(',') && !raw.contains('.') {
            Decimal::from_str(&raw.replace(',', ".")).ok()
        } else {
            None
        }
    })?;

    if (number.is_sign_negative() && !number.is_zero()) || !number.fract().is_zero() {
        return None;
    }
    number.trunc().to_u64()
}

/// Selects the four columns of every data row.
///
/// Fully blank rows vanish. Rows without description or code are skipped
/// with a warning. Unreadable quantities become 0 with a warning each.
pub fn project_rows(sheet: &RawSheet, columns: ColumnMap) -> (Vec<SourceRow>, Vec<Warning>) {
    let mut rows = Vec::with_capacity(sheet.rows.len());
    let mut warnings = Vec::new();

    for (index, cells) in sheet.rows.iter().enumerate() {
        let line = RawSheet::line_number(index);
        let cell = |i: usize| cells.get(i).map(|s| s.trim()).unwrap_or("");

        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let product_name = cell(columns.description);
        if product_name.is_empty() {
            warnings.push(Warning::RowSkipped {
                row: line,
                reason: format!("{COL_DESCRIPTION} vazia"),
            });
            continue;
        }

        let code = cell(columns.code);
        if code.is_empty() {
            warnings.push(Warning::RowSkipped {
                row: line,
                reason: format!("{COL_CODE} vazio"),
            });
            continue;
        }

        let mut quantity = |i: usize, column: &str| -> u64 {
            let raw = cell(i);
            parse_quantity(raw).unwrap_or_else(|| {
                warnings.push(Warning::QuantityCoerced {
                    row: line,
                    column: column.to_string(),
                    raw: raw.to_string(),
                });
                0
            })
        };

        let units_broken = quantity(columns.broken, COL_BROKEN);
        let units_sold = quantity(columns.sold, COL_SOLD);

        rows.push(SourceRow {
            line,
            code: normalize_code(code),
            product_name: product_name.to_string(),
            units_broken,
            units_sold,
        });
    }

    (rows, warnings)
}

// =============================================================================
// Stage 5: aggregation
// =============================================================================

/// Sums of all source rows sharing a `(code, product)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedRow {
    pub code: String,
    pub product_name: String,
    pub units_broken: u64,
    pub units_sold: u64,
}

/// Collapses duplicate `(code, product)` rows, keeping first-seen order.
///
/// Fails on the first row whose sum no longer fits a `u64`.
pub fn aggregate(rows: &[SourceRow]) -> Result<Vec<AggregatedRow>, ValidationError> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut out: Vec<AggregatedRow> = Vec::new();

    for row in rows {
        let key = (row.code.as_str(), row.product_name.as_str());
        match index.get(&key) {
            Some(&i) => {
                let total = &mut out[i];
                total.units_broken = sum_quantity(total.units_broken, row.units_broken, row.line, COL_BROKEN)?;
                total.units_sold = sum_quantity(total.units_sold, row.units_sold, row.line, COL_SOLD)?;
            }
            None => {
                index.insert(key, out.len());
                out.push(AggregatedRow {
                    code: row.code.clone(),
                    product_name: row.product_name.clone(),
                    units_broken: row.units_broken,
                    units_sold: row.units_sold,
                });
            }
        }
    }

    Ok(out)
}

fn sum_quantity(total: u64, value: u64, row: usize, column: &str) -> Result<u64, ValidationError> {
    total.checked_add(value).ok_or_else(|| ValidationError::QuantityOverflow {
        row,
        column: column.to_string(),
    })
}

// =============================================================================
// Stages 6-9: metrics, catalog join, unpriced filter, gross profit
// =============================================================================

/// Branch and month every imported row is stamped with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    pub branch: String,
    pub month: u32,
    pub year: i32,
}

impl ImportBatch {
    /// Validates branch and month, returning the batch date (day 1).
    fn validate(&self) -> Result<(String, NaiveDate), ValidationError> {
        let branch = validate_branch(&self.branch)?;
        let month = validate_month(self.month)?;
        let date = NaiveDate::from_ymd_opt(self.year, month, 1).ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "Ano".to_string(),
                value: self.year.to_string(),
            }
        })?;
        Ok((branch, date))
    }
}

/// Everything the import decided, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    /// Records to append to the ledger.
    pub records: Vec<BreakageRecord>,
    /// Distinct unpriced product names, in source order.
    pub skipped_products: Vec<String>,
    /// Per-row warnings (coercions, skipped rows).
    pub warnings: Vec<Warning>,
    /// Data rows read from the source, blank rows excluded.
    pub source_rows: usize,
    /// Rows left after aggregation.
    pub aggregated_rows: usize,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All warnings, the unpriced summary last.
    pub fn all_warnings(&self) -> Vec<Warning> {
        let mut warnings = self.warnings.clone();
        if !self.skipped_products.is_empty() {
            warnings.push(Warning::UnpricedProductsSkipped {
                products: self.skipped_products.clone(),
            });
        }
        warnings
    }
}

/// Runs every pure stage of the import.
pub fn plan_import(sheet: &RawSheet, batch: &ImportBatch, catalog: &Catalog) -> CoreResult<ImportPlan> {
    let (branch, date) = batch.validate()?;
    let columns = ColumnMap::resolve(&sheet.headers)?;

    let (source, warnings) = project_rows(sheet, columns);
    let aggregated = aggregate(&source)?;

    let mut records = Vec::with_capacity(aggregated.len());
    let mut skipped_products: Vec<String> = Vec::new();

    for row in &aggregated {
        let Some(price) = catalog.lookup_by_code_and_product(&row.code, &row.product_name) else {
            if !skipped_products.contains(&row.product_name) {
                skipped_products.push(row.product_name.clone());
            }
            continue;
        };

        records.push(BreakageRecord {
            id: RecordId::new(),
            date,
            product_name: row.product_name.clone(),
            units_sold: row.units_sold,
            units_broken: row.units_broken,
            breakage_percent: compute_breakage_percent(row.units_sold, row.units_broken),
            branch: branch.clone(),
            gross_profit: compute_gross_profit(Some(price), row.units_sold, row.units_broken),
        });
    }

    Ok(ImportPlan {
        records,
        skipped_products,
        warnings,
        source_rows: source.len(),
        aggregated_rows: aggregated.len(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::PriceEntry;
    use rust_decimal_macros::dec;

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            PriceEntry::new("001", "Coxinha", dec!(1.00), dec!(2.50)),
            PriceEntry::new("002", "Quibe", dec!(1.20), dec!(3.00)),
        ])
    }

    fn batch() -> ImportBatch {
        ImportBatch {
            branch: "Centro".to_string(),
            month: 3,
            year: 2024,
        }
    }

    const HEADERS: &[&str] = &["CÓD. VIP", "DESCRIÇÃO", "ESTOQUE", "QUEBRA", "VENDA"];

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  cód.   vip "), "COD. VIP");
        assert_eq!(normalize_header("Descrição"), "DESCRICAO");
        assert_eq!(normalize_header("VENDA"), "VENDA");
    }

    #[test]
    fn test_resolve_columns_any_order_and_case() {
        let headers: Vec<String> = ["venda ", " Quebra", "descrição", "Cód. Vip"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = ColumnMap::resolve(&headers).unwrap();
        assert_eq!(map, ColumnMap { code: 3, description: 2, broken: 1, sold: 0 });
    }

    #[test]
    fn test_resolve_missing_description() {
        let headers: Vec<String> = ["CÓD. VIP", "PRODUTO", "QUEBRA", "VENDA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            ColumnMap::resolve(&headers),
            Err(SchemaError::MissingColumn("DESCRIÇÃO".to_string()))
        );
        assert_eq!(ColumnMap::resolve(&[]), Err(SchemaError::Empty));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("10"), Some(10));
        assert_eq!(parse_quantity(" 10.0 "), Some(10));
        assert_eq!(parse_quantity("12,0"), Some(12));
        assert_eq!(parse_quantity(""), Some(0));
        assert_eq!(parse_quantity("-0"), Some(0));
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("-3"), None);
        assert_eq!(parse_quantity("2.5"), None);
    }

    #[test]
    fn test_coxinha_scenario() {
        let sheet = sheet(HEADERS, &[&["001", "Coxinha", "5", "10", "90"]]);
        let plan = plan_import(&sheet, &batch(), &catalog()).unwrap();

        assert_eq!(plan.records.len(), 1);
        let record = &plan.records[0];
        assert_eq!(record.breakage_percent, dec!(10.00));
        assert_eq!(record.gross_profit, Some(dec!(125)));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(record.branch, "Centro");
        assert!(plan.all_warnings().is_empty());
    }

    #[test]
    fn test_duplicates_are_summed() {
        let sheet = sheet(
            HEADERS,
            &[
                &["1", "Coxinha", "", "4", "40"],
                &["002", "Quibe", "", "1", "9"],
                &["001", "Coxinha", "", "6", "50"],
            ],
        );
        let plan = plan_import(&sheet, &batch(), &catalog()).unwrap();

        assert_eq!(plan.source_rows, 3);
        assert_eq!(plan.aggregated_rows, 2);
        let coxinha = &plan.records[0];
        assert_eq!(coxinha.product_name, "Coxinha");
        assert_eq!((coxinha.units_broken, coxinha.units_sold), (10, 90));
        assert_eq!(coxinha.gross_profit, Some(dec!(125)));
    }

    #[test]
    fn test_unpriced_rows_are_skipped() {
        let sheet = sheet(
            HEADERS,
            &[
                &["001", "Coxinha", "", "10", "90"],
                &["003", "Esfiha", "", "2", "20"],
                &["004", "Esfiha", "", "1", "5"],
                // priced name, wrong code: no join
                &["999", "Quibe", "", "1", "5"],
            ],
        );
        let plan = plan_import(&sheet, &batch(), &catalog()).unwrap();

        assert_eq!(plan.records.len(), 1);
        assert_eq!(plan.skipped_products, vec!["Esfiha", "Quibe"]);
        assert_eq!(
            plan.all_warnings().last(),
            Some(&Warning::UnpricedProductsSkipped {
                products: vec!["Esfiha".to_string(), "Quibe".to_string()]
            })
        );
    }

    #[test]
    fn test_all_unpriced_yields_empty_plan() {
        let sheet = sheet(HEADERS, &[&["003", "Esfiha", "", "2", "20"]]);
        let plan = plan_import(&sheet, &batch(), &catalog()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_bad_quantities_warn() {
        let sheet = sheet(HEADERS, &[&["001", "Coxinha", "", "x", "90"]]);
        let plan = plan_import(&sheet, &batch(), &catalog()).unwrap();

        assert_eq!(plan.records[0].units_broken, 0);
        assert_eq!(
            plan.warnings,
            vec![Warning::QuantityCoerced {
                row: 2,
                column: "QUEBRA".to_string(),
                raw: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_and_incomplete_rows() {
        let sheet = sheet(
            HEADERS,
            &[
                &["", "", "", "", ""],
                &["001", "", "", "1", "1"],
                &["", "Coxinha", "", "1", "1"],
                &["001", "Coxinha", "", "1", "9"],
            ],
        );
        let plan = plan_import(&sheet, &batch(), &catalog()).unwrap();

        assert_eq!(plan.source_rows, 1);
        assert_eq!(plan.warnings.len(), 2);
        assert!(matches!(plan.warnings[0], Warning::RowSkipped { row: 3, .. }));
        assert!(matches!(plan.warnings[1], Warning::RowSkipped { row: 4, .. }));
    }

    #[test]
    fn test_duplicate_sum_past_u64_is_rejected() {
        let max = u64::MAX.to_string();
        let sheet = sheet(
            HEADERS,
            &[
                &["001", "Coxinha", "", max.as_str(), "1"],
                &["001", "Coxinha", "", "1", "1"],
            ],
        );

        let err = plan_import(&sheet, &batch(), &catalog()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::QuantityOverflow { row: 3, ref column }) if column == COL_BROKEN
        ));
        assert_eq!(err.to_string(), "Linha 3: a soma de QUEBRA excede o limite");
    }

    #[test]
    fn test_batch_validation() {
        let sheet = sheet(HEADERS, &[]);
        let mut bad = batch();
        bad.branch = "  ".to_string();
        let err = plan_import(&sheet, &bad, &catalog()).unwrap_err();
        assert_eq!(err.to_string(), "Filial é obrigatório");

        let mut bad = batch();
        bad.month = 13;
        assert!(matches!(
            plan_import(&sheet, &bad, &catalog()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_schema_error_propagates() {
        let sheet = sheet(&["CÓD. VIP", "QUEBRA", "VENDA"], &[]);
        assert!(matches!(
            plan_import(&sheet, &batch(), &catalog()),
            Err(CoreError::Schema(SchemaError::MissingColumn(_)))
        ));
    }
}
