//! `quebra record ...`: manual breakage records.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use quebra_core::{BreakageRecord, Cell, DateRange, RecordDraft, RecordId, Table};
use quebra_store::{AppState, StoreError};
use serde::Serialize;

use crate::output::{print_json, print_warnings, render_table, selection};

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Add one record
    Add(RecordFields),
    /// Overwrite a record, recomputing its metrics
    Edit(EditRecordArgs),
    /// Delete one record (the ledger file is backed up first)
    Delete(TargetArgs),
    /// Delete every record of a period, optionally only some branches
    Purge(PurgeArgs),
    /// List records, newest first
    List(ListArgs),
}

#[derive(Args)]
pub struct RecordFields {
    #[arg(long, help = "Date of the observation (YYYY-MM-DD)")]
    data: NaiveDate,
    #[arg(long, help = "Product name, as in the price catalog")]
    produto: String,
    #[arg(long, default_value_t = 0, help = "Units sold")]
    venda: u64,
    #[arg(long, default_value_t = 0, help = "Units broken")]
    quebra: u64,
    #[arg(long, help = "Branch name")]
    filial: String,
}

impl From<RecordFields> for RecordDraft {
    fn from(fields: RecordFields) -> Self {
        RecordDraft {
            date: fields.data,
            product_name: fields.produto,
            units_sold: fields.venda,
            units_broken: fields.quebra,
            branch: fields.filial,
        }
    }
}

#[derive(Args)]
pub struct TargetArgs {
    #[arg(help = "Record id, or a 'YYYY-MM-DD | product | branch' label")]
    alvo: String,
}

#[derive(Args)]
pub struct EditRecordArgs {
    #[command(flatten)]
    target: TargetArgs,
    #[command(flatten)]
    fields: RecordFields,
}

#[derive(Args)]
pub struct PurgeArgs {
    #[arg(long, help = "First day of the period (inclusive)")]
    inicio: NaiveDate,
    #[arg(long, help = "Last day of the period (inclusive)")]
    fim: NaiveDate,
    #[arg(long, help = "Branch to purge; repeat for several (default: all)")]
    filial: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, help = "Show at most this many records")]
    limite: Option<usize>,
}

#[derive(Serialize)]
struct PurgeResult {
    removed: usize,
}

pub fn handle(state: &mut AppState, command: RecordCommands, json: bool) -> Result<()> {
    match command {
        RecordCommands::Add(fields) => {
            let outcome = state
                .records()
                .create(fields.into())
                .context("failed to add record")?;
            print_warnings(&outcome);
            if json {
                print_json(&outcome)?;
            } else {
                render_record(&outcome.value);
            }
        }
        RecordCommands::Edit(args) => {
            let id = resolve_target(state, &args.target.alvo)?;
            let outcome = state
                .records()
                .update(id, args.fields.into())
                .with_context(|| format!("failed to edit record {id}"))?;
            print_warnings(&outcome);
            if json {
                print_json(&outcome)?;
            } else {
                render_record(&outcome.value);
            }
        }
        RecordCommands::Delete(args) => {
            let id = resolve_target(state, &args.alvo)?;
            let deleted = state
                .records()
                .delete(id)
                .with_context(|| format!("failed to delete record {id}"))?;
            if json {
                print_json(&deleted)?;
            } else {
                println!("Registro excluído: {}", deleted.record.summary());
                if let Some(backup) = &deleted.backup {
                    println!("Backup: {}", backup.display());
                }
            }
        }
        RecordCommands::Purge(args) => {
            let range = DateRange::new(args.inicio, args.fim).map_err(StoreError::from)?;
            let removed = state
                .records()
                .delete_by_filter(range, &selection(args.filial))
                .context("failed to purge records")?;
            if json {
                print_json(&PurgeResult { removed })?;
            } else if removed == 0 {
                println!("Nenhum registro no período selecionado.");
            } else {
                println!("{removed} registro(s) excluído(s).");
            }
        }
        RecordCommands::List(args) => {
            let mut records = state.records().list();
            if let Some(limit) = args.limite {
                records.truncate(limit);
            }
            if json {
                print_json(&records)?;
            } else {
                render_table(&records_table(&records));
            }
        }
    }
    Ok(())
}

/// Accepts a record id, falling back to the legacy summary label.
fn resolve_target(state: &mut AppState, target: &str) -> Result<RecordId> {
    match target.parse::<RecordId>() {
        Ok(id) => Ok(id),
        Err(parse_error) => state
            .records()
            .find_by_summary(target.trim())
            .ok_or_else(|| StoreError::from(parse_error).into()),
    }
}

fn render_record(record: &BreakageRecord) {
    println!("{} ({})", record.summary(), record.id);
    println!(
        "  venda {}  quebra {}  % quebra {}",
        record.units_sold, record.units_broken, record.breakage_percent
    );
    match record.gross_profit {
        Some(profit) => println!("  lucro bruto {}", crate::output::format_money(profit)),
        None => println!("  lucro bruto: sem preço cadastrado"),
    }
}

fn records_table(records: &[BreakageRecord]) -> Table {
    let mut table = Table::new([
        "Data",
        "Produto",
        "Venda",
        "Quebra",
        "% Quebra",
        "Filial",
        "Lucro Bruto",
        "ID",
    ]);
    for record in records {
        table.push_row(vec![
            Cell::Date(record.date),
            Cell::text(record.product_name.as_str()),
            Cell::Integer(record.units_sold),
            Cell::Integer(record.units_broken),
            Cell::Decimal(record.breakage_percent),
            Cell::text(record.branch.as_str()),
            Cell::optional_decimal(record.gross_profit),
            Cell::text(record.id.to_string()),
        ]);
    }
    table
}
