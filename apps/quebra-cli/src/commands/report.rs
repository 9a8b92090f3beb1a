//! `quebra report` and `quebra dashboard`: read-only views and export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use quebra_core::report::{month_label, BreakageReport, Dashboard, DashboardFilter, Measure, ReportFilter};
use quebra_core::{BreakageLevel, Cell, DateRange, Table};
use quebra_store::{AppState, ExportFormat, ReportService, StoreError};

use crate::output::{format_money, print_json, render_table, selection};

#[derive(Args)]
pub struct ExportArgs {
    #[arg(long, value_name = "PATH", help = "Also write the table as CSV")]
    csv: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Also write the table as an XLSX workbook")]
    xlsx: Option<PathBuf>,
}

impl ExportArgs {
    fn write(&self, reports: &ReportService<'_>, table: &Table) -> Result<()> {
        let targets = [(&self.csv, ExportFormat::Csv), (&self.xlsx, ExportFormat::Xlsx)];
        for (path, format) in targets {
            if let Some(path) = path {
                reports
                    .export_as(table, path, format)
                    .with_context(|| format!("failed to export {}", path.display()))?;
                eprintln!("Exportado: {}", path.display());
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct ReportArgs {
    #[arg(long, help = "First day of the period (inclusive)")]
    inicio: NaiveDate,
    #[arg(long, help = "Last day of the period (inclusive)")]
    fim: NaiveDate,
    #[arg(long, help = "Branch; repeat for several (default: all)")]
    filial: Vec<String>,
    #[arg(long, help = "Product; repeat for several (default: all)")]
    produto: Vec<String>,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MeasureArg {
    /// Breakage % per month, high cells flagged
    Percentual,
    /// Units broken
    Quebra,
    /// Units sold
    Venda,
    /// Gross profit
    Margem,
    /// Every measure side by side
    Consolidado,
}

#[derive(Args)]
pub struct DashboardArgs {
    #[arg(long, help = "Year (default: latest year in the ledger)")]
    ano: Option<i32>,
    #[arg(long, help = "Branch; repeat for several (default: all)")]
    filial: Vec<String>,
    #[arg(long, help = "Product; repeat for several (default: all)")]
    produto: Vec<String>,
    #[arg(long, value_enum, default_value = "percentual", help = "Measure shown on screen")]
    medida: MeasureArg,
    #[command(flatten)]
    export: ExportArgs,
}

pub fn handle_report(state: &AppState, args: ReportArgs, json: bool) -> Result<()> {
    let filter = ReportFilter {
        branches: selection(args.filial),
        products: selection(args.produto),
        range: DateRange::new(args.inicio, args.fim).map_err(StoreError::from)?,
    };

    let reports = state.reports();
    let report = reports.report(&filter);
    let table = report.to_table();
    args.export.write(&reports, &table)?;

    if json {
        return print_json(&report);
    }
    if report.is_empty() {
        println!("Nenhum dado para os filtros selecionados.");
        return Ok(());
    }
    render_report(&report, &table);
    Ok(())
}

pub fn handle_dashboard(state: &AppState, args: DashboardArgs, json: bool) -> Result<()> {
    let reports = state.reports();
    let Some(year) = args.ano.or_else(|| reports.years().last().copied()) else {
        println!("O registro de quebras está vazio.");
        return Ok(());
    };

    let filter = DashboardFilter {
        branches: selection(args.filial),
        products: selection(args.produto),
        year,
    };
    let dashboard = reports.dashboard(&filter);
    args.export.write(&reports, &dashboard.consolidated_table())?;

    if json {
        return print_json(&dashboard);
    }
    if dashboard.is_empty() {
        println!("Nenhum dado para {year} com os filtros selecionados.");
        return Ok(());
    }
    render_dashboard(&dashboard, args.medida);
    Ok(())
}

fn render_report(report: &BreakageReport, table: &Table) {
    render_table(table);
    println!();
    println!(
        "{} registro(s), lucro bruto total {}",
        report.len(),
        format_money(report.total_gross_profit())
    );
}

fn render_dashboard(dashboard: &Dashboard, measure: MeasureArg) {
    println!("Dashboard {} (limite de quebra {}%)", dashboard.year, dashboard.threshold);
    println!();

    let table = match measure {
        MeasureArg::Percentual => percent_view(dashboard),
        MeasureArg::Quebra => dashboard.pivot(Measure::UnitsBroken),
        MeasureArg::Venda => dashboard.pivot(Measure::UnitsSold),
        MeasureArg::Margem => dashboard.pivot(Measure::GrossProfit),
        MeasureArg::Consolidado => dashboard.consolidated_table(),
    };
    render_table(&table);

    println!();
    println!("Totais do Grupo");
    println!("  quebra      {}", dashboard.totals.units_broken);
    println!("  venda       {}", dashboard.totals.units_sold);
    println!("  margem      {}", format_money(dashboard.totals.gross_profit));
}

/// Breakage % pivot with the cell classification spelled out.
fn percent_view(dashboard: &Dashboard) -> Table {
    let mut table = Table::new(
        std::iter::once("Filial".to_string()).chain(dashboard.months.iter().map(|&m| month_label(m).to_string())),
    );
    for row in dashboard.all_rows() {
        let mut cells = vec![Cell::text(row.branch.as_str())];
        cells.extend(row.cells.iter().map(|cell| match (cell.level, cell.breakage_percent) {
            (BreakageLevel::High, Some(percent)) => Cell::text(format!("{percent} !")),
            (BreakageLevel::NoSales, _) => Cell::text("sem venda"),
            (_, percent) => Cell::optional_decimal(percent),
        }));
        table.push_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use quebra_core::report::{DashboardRow, GroupTotals, MonthCell};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn cell(month: u32, broken: u64, sold: u64, percent: Option<Decimal>, level: BreakageLevel) -> MonthCell {
        MonthCell {
            month,
            units_broken: broken,
            units_sold: sold,
            breakage_percent: percent,
            level,
            gross_profit: Decimal::ZERO,
        }
    }

    #[test]
    fn test_percent_view_flags_cells() {
        let dashboard = Dashboard {
            year: 2024,
            threshold: dec!(8),
            months: vec![1, 2],
            rows: vec![DashboardRow {
                branch: "Centro".to_string(),
                cells: vec![
                    cell(1, 10, 100, Some(dec!(10)), BreakageLevel::High),
                    cell(2, 3, 0, None, BreakageLevel::NoSales),
                ],
            }],
            group: DashboardRow {
                branch: "Grupo".to_string(),
                cells: vec![
                    cell(1, 10, 100, Some(dec!(10)), BreakageLevel::High),
                    cell(2, 0, 0, Some(dec!(0)), BreakageLevel::Normal),
                ],
            },
            totals: GroupTotals {
                units_broken: 13,
                units_sold: 100,
                gross_profit: Decimal::ZERO,
            },
        };

        let table = percent_view(&dashboard);
        assert_eq!(table.columns()[0], "Filial");
        assert_eq!(table.cell(0, month_label(1)), Some(&Cell::text("10 !")));
        assert_eq!(table.cell(0, month_label(2)), Some(&Cell::text("sem venda")));
        assert_eq!(table.cell(1, month_label(2)), Some(&Cell::Decimal(dec!(0))));
    }
}
