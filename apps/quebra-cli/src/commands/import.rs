//! `quebra import`: monthly spreadsheet import.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use quebra_core::import::ImportBatch;
use quebra_store::AppState;

use crate::output::{print_json, print_warnings};

#[derive(Args)]
pub struct ImportArgs {
    #[arg(help = "Spreadsheet to import (.xlsx, .xls, .ods or .csv)")]
    arquivo: PathBuf,
    #[arg(long, help = "Branch the whole file belongs to")]
    filial: String,
    #[arg(long, help = "Month (1-12); records are dated on its first day")]
    mes: u32,
    #[arg(long, help = "Year")]
    ano: i32,
}

pub fn handle(state: &mut AppState, args: ImportArgs, json: bool) -> Result<()> {
    let batch = ImportBatch {
        branch: args.filial,
        month: args.mes,
        year: args.ano,
    };

    let outcome = state
        .imports()
        .import(&args.arquivo, &batch)
        .with_context(|| format!("failed to import {}", args.arquivo.display()))?;
    print_warnings(&outcome);

    if json {
        return print_json(&outcome);
    }

    let summary = &outcome.value;
    if summary.appended == 0 {
        println!("Nenhuma linha com preço cadastrado; nada foi importado.");
    } else {
        println!(
            "{} linha(s) importada(s) para {} em {:02}/{} ({} linha(s) lidas, {} após agrupar).",
            summary.appended, batch.branch, batch.month, batch.year, summary.source_rows, summary.aggregated_rows
        );
    }
    if !summary.skipped_products.is_empty() {
        println!("Sem preço cadastrado: {}", summary.skipped_products.join(", "));
    }
    Ok(())
}
