//! # Ledger Repository
//!
//! Reads and writes the breakage ledger file.
//!
//! ## File Layout
//! ```text
//! Data,Produto,Vendidos,Quebra,% Quebra,Filial,Lucro Bruto,ID
//! 2024-03-01,Coxinha,90,10,10.00,Centro,125.00,5d0c…
//! 2024-03-01,Esfiha,20,2,9.09,Centro,,91a2…
//! ```
//!
//! `Lucro Bruto` is empty when the product had no price, and reads back as
//! `None`, never 0.
//!
//! ## Reading Older Files
//! - no `ID` column: every row gets a fresh id, written on the next save
//! - empty `Filial`: loaded as `Desconhecida`
//! - `2024-03-01 00:00:00` dates and `90.0` quantities are accepted
//! - missing `% Quebra` is recomputed from the quantities
//! - unknown columns are ignored

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quebra_core::import::parse_quantity;
use quebra_core::metrics::compute_breakage_percent;
use quebra_core::{BreakageRecord, Ledger, RecordId, DEFAULT_BRANCH};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{is_blank, parse_decimal};
use crate::error::{StoreError, StoreResult};
use crate::persist::write_atomic;

/// One ledger file row as written.
#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    #[serde(rename = "Data")]
    date: NaiveDate,
    #[serde(rename = "Produto")]
    product_name: &'a str,
    #[serde(rename = "Vendidos")]
    units_sold: u64,
    #[serde(rename = "Quebra")]
    units_broken: u64,
    #[serde(rename = "% Quebra")]
    breakage_percent: Decimal,
    #[serde(rename = "Filial")]
    branch: &'a str,
    #[serde(rename = "Lucro Bruto")]
    gross_profit: Option<Decimal>,
    #[serde(rename = "ID")]
    id: RecordId,
}

impl<'a> From<&'a BreakageRecord> for LedgerRow<'a> {
    fn from(r: &'a BreakageRecord) -> Self {
        LedgerRow {
            date: r.date,
            product_name: &r.product_name,
            units_sold: r.units_sold,
            units_broken: r.units_broken,
            breakage_percent: r.breakage_percent,
            branch: &r.branch,
            gross_profit: r.gross_profit,
            id: r.id,
        }
    }
}

/// One ledger file row as read, before any interpretation.
#[derive(Debug, Deserialize)]
struct RawLedgerRow {
    #[serde(rename = "Data")]
    date: String,
    #[serde(rename = "Produto", default)]
    product_name: String,
    #[serde(rename = "Vendidos", default)]
    units_sold: String,
    #[serde(rename = "Quebra", default)]
    units_broken: String,
    #[serde(rename = "% Quebra", default)]
    breakage_percent: Option<String>,
    #[serde(rename = "Filial", default)]
    branch: String,
    #[serde(rename = "Lucro Bruto", default)]
    gross_profit: Option<String>,
    #[serde(rename = "ID", default)]
    id: Option<String>,
}

/// Parses `YYYY-MM-DD`, ignoring a trailing time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split([' ', 'T']).next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl RawLedgerRow {
    fn into_record(self) -> Result<(BreakageRecord, bool), String> {
        let date = parse_date(&self.date).ok_or_else(|| format!("data inválida '{}'", self.date))?;
        let units_sold =
            parse_quantity(&self.units_sold).ok_or_else(|| format!("Vendidos inválido '{}'", self.units_sold))?;
        let units_broken =
            parse_quantity(&self.units_broken).ok_or_else(|| format!("Quebra inválida '{}'", self.units_broken))?;

        let breakage_percent = match self.breakage_percent.as_deref() {
            Some(raw) if !is_blank(raw) => {
                parse_decimal(raw).ok_or_else(|| format!("% Quebra inválida '{raw}'"))?
            }
            _ => compute_breakage_percent(units_sold, units_broken),
        };

        let gross_profit = match self.gross_profit.as_deref() {
            Some(raw) if !is_blank(raw) => {
                Some(parse_decimal(raw).ok_or_else(|| format!("Lucro Bruto inválido '{raw}'"))?)
            }
            _ => None,
        };

        let branch = match self.branch.trim() {
            "" => DEFAULT_BRANCH.to_string(),
            b => b.to_string(),
        };

        let (id, generated) = match self.id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => (raw.parse::<RecordId>().map_err(|e| e.to_string())?, false),
            _ => (RecordId::new(), true),
        };

        let record = BreakageRecord {
            id,
            date,
            product_name: self.product_name.trim().to_string(),
            units_sold,
            units_broken,
            breakage_percent,
            branch,
            gross_profit,
        };
        Ok((record, generated))
    }
}

/// Repository for the breakage ledger file.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    path: PathBuf,
}

impl LedgerRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LedgerRepository { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole ledger. A missing file is an empty ledger.
    pub fn load(&self) -> StoreResult<Ledger> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Ledger file not found, starting empty");
            return Ok(Ledger::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        let mut generated = 0usize;

        for row in reader.records() {
            let row = row?;
            let line = row.position().map_or(0, |p| p.line());
            if row.iter().all(str::is_empty) {
                continue;
            }

            let raw: RawLedgerRow = row.deserialize(Some(&headers)).map_err(|e| self.corrupt(line, e.to_string()))?;
            let (record, fresh_id) = raw.into_record().map_err(|reason| self.corrupt(line, reason))?;
            generated += usize::from(fresh_id);
            records.push(record);
        }

        if generated > 0 {
            debug!(generated, "Assigned ids to ledger rows without one");
        }
        info!(path = %self.path.display(), count = records.len(), "Ledger loaded");

        Ok(Ledger::from_records(records))
    }

    /// Rewrites the whole ledger file atomically.
    pub fn save(&self, ledger: &Ledger) -> StoreResult<()> {
        let bytes = encode(ledger.records())?;
        write_atomic(&self.path, &bytes)?;
        info!(path = %self.path.display(), count = ledger.len(), "Ledger saved");
        Ok(())
    }

    fn corrupt(&self, line: u64, reason: String) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            line,
            reason,
        }
    }
}

/// Serializes records in file layout, header included even when empty.
fn encode(records: &[BreakageRecord]) -> StoreResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(["Data", "Produto", "Vendidos", "Quebra", "% Quebra", "Filial", "Lucro Bruto", "ID"])?;
    for record in records {
        writer.serialize(LedgerRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::Csv(csv::Error::from(e.into_error())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    fn record(profit: Option<Decimal>) -> BreakageRecord {
        BreakageRecord {
            id: RecordId::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            product_name: "Coxinha".to_string(),
            units_sold: 90,
            units_broken: 10,
            breakage_percent: dec!(10.00),
            branch: "Centro".to_string(),
            gross_profit: profit,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = LedgerRepository::new(dir.path().join("dados.csv"));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_null_profit() {
        let dir = TempDir::new().unwrap();
        let repo = LedgerRepository::new(dir.path().join("dados.csv"));
        let ledger = Ledger::from_records(vec![record(Some(dec!(125))), record(None)]);

        repo.save(&ledger).unwrap();
        let loaded = repo.load().unwrap();

        assert_eq!(loaded, ledger);
        assert_eq!(loaded.records()[1].gross_profit, None);
    }

    #[test]
    fn test_empty_ledger_writes_header() {
        let dir = TempDir::new().unwrap();
        let repo = LedgerRepository::new(dir.path().join("dados.csv"));
        repo.save(&Ledger::default()).unwrap();

        let text = fs::read_to_string(repo.path()).unwrap();
        assert_eq!(text.trim(), "Data,Produto,Vendidos,Quebra,% Quebra,Filial,Lucro Bruto,ID");
    }

    #[test]
    fn test_legacy_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dados.csv");
        fs::write(
            &path,
            "Data,Produto,Inicial,Vendidos,Quebra,% Quebra,Filial,Estoque Final,Lucro Bruto\n\
             2024-03-01 00:00:00,Coxinha,0,90.0,10.0,10.0,,0,125.0\n\
             2024-03-02,Esfiha,0,20,0,0.0,Norte,0,\n",
        )
        .unwrap();

        let ledger = LedgerRepository::new(&path).load().unwrap();

        assert_eq!(ledger.len(), 2);
        let first = &ledger.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!((first.units_sold, first.units_broken), (90, 10));
        assert_eq!(first.branch, "Desconhecida");
        assert_eq!(first.gross_profit, Some(dec!(125)));
        assert_eq!(ledger.records()[1].gross_profit, None);
        assert_ne!(first.id, ledger.records()[1].id);
    }

    #[test]
    fn test_corrupt_row_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dados.csv");
        fs::write(
            &path,
            "Data,Produto,Vendidos,Quebra,% Quebra,Filial,Lucro Bruto\n\
             2024-03-01,Coxinha,90,10,10,Centro,125\n\
             ontem,Coxinha,90,10,10,Centro,125\n",
        )
        .unwrap();

        let err = LedgerRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 3, .. }));
    }
}
