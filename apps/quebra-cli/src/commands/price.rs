//! `quebra price ...`: price catalog maintenance.

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use quebra_core::{Cell, PriceEntry, Table};
use quebra_store::AppState;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::output::{format_money, print_json, render_table};

#[derive(Subcommand)]
pub enum PriceCommands {
    /// Insert or replace the price of a (code, product) pair
    Set(PriceFields),
    /// Rewrite the entry of an existing product
    Edit(EditPriceArgs),
    /// Remove every entry of a product
    Delete(DeletePriceArgs),
    /// List the catalog
    List,
}

#[derive(Args)]
pub struct PriceFields {
    #[arg(long, default_value = "", help = "Supplier code (CÓD. VIP)")]
    codigo: String,
    #[arg(long, help = "Product name")]
    produto: String,
    #[arg(long, value_parser = parse_decimal, help = "Unit cost")]
    custo: Decimal,
    #[arg(long, value_parser = parse_decimal, help = "Unit sale price, above the cost")]
    preco: Decimal,
}

impl From<PriceFields> for PriceEntry {
    fn from(fields: PriceFields) -> Self {
        PriceEntry::new(fields.codigo, fields.produto, fields.custo, fields.preco)
    }
}

#[derive(Args)]
pub struct EditPriceArgs {
    #[arg(help = "Product name currently in the catalog")]
    original: String,
    #[command(flatten)]
    fields: PriceFields,
}

#[derive(Args)]
pub struct DeletePriceArgs {
    #[arg(help = "Product name")]
    produto: String,
}

#[derive(Serialize)]
struct DeleteResult<'a> {
    product: &'a str,
    removed: usize,
}

pub fn handle(state: &mut AppState, command: PriceCommands, json: bool) -> Result<()> {
    match command {
        PriceCommands::Set(fields) => {
            let saved = state.prices().upsert(fields.into()).context("failed to save price")?;
            if json {
                print_json(&saved)?;
            } else {
                render_price(&saved);
            }
        }
        PriceCommands::Edit(args) => {
            let saved = state
                .prices()
                .edit(&args.original, args.fields.into())
                .with_context(|| format!("failed to edit price of '{}'", args.original))?;
            if json {
                print_json(&saved)?;
            } else {
                render_price(&saved);
            }
        }
        PriceCommands::Delete(args) => {
            let removed = state
                .prices()
                .delete(&args.produto)
                .with_context(|| format!("failed to delete price of '{}'", args.produto))?;
            if json {
                print_json(&DeleteResult {
                    product: &args.produto,
                    removed,
                })?;
            } else {
                println!("Preço excluído: {} ({removed} entrada(s))", args.produto);
            }
        }
        PriceCommands::List => {
            let prices = state.prices();
            let entries = prices.list();
            if json {
                print_json(&entries)?;
            } else {
                render_table(&catalog_table(entries));
            }
        }
    }
    Ok(())
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| format!("invalid decimal '{raw}'"))
}

fn render_price(entry: &PriceEntry) {
    let code = if entry.code.is_empty() { "-" } else { entry.code.as_str() };
    println!(
        "{} [{}]  custo {}  venda {}",
        entry.product_name,
        code,
        format_money(entry.unit_cost),
        format_money(entry.unit_sale_price)
    );
}

fn catalog_table(entries: &[PriceEntry]) -> Table {
    let mut table = Table::new(["CÓD. VIP", "Produto", "Custo Unitário", "Preço Venda Unitário"]);
    for entry in entries {
        table.push_row(vec![
            Cell::text(entry.code.as_str()),
            Cell::text(entry.product_name.as_str()),
            Cell::Decimal(entry.unit_cost),
            Cell::Decimal(entry.unit_sale_price),
        ]);
    }
    table
}
