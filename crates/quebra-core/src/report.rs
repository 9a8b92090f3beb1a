//! # Reporting & Aggregation
//!
//! Read-only views over the ledger: the filtered report with catalog prices
//! joined in, and the monthly branch dashboard.
//!
//! ## Dashboard Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dashboard (one year)                                │
//! │                                                                         │
//! │            │   jan            │   fev            │  ...               │
//! │  ──────────┼──────────────────┼──────────────────┼──────              │
//! │  Centro    │ Σbroken Σsold    │ Σbroken Σsold    │                    │
//! │            │ % = Σb/Σs×100    │ %                │                    │
//! │            │ Σ gross profit   │ Σ gross profit   │                    │
//! │  Norte     │ ...              │ ...              │                    │
//! │  ──────────┼──────────────────┼──────────────────┼──────              │
//! │  Grupo     │ column sums, % recomputed from the sums                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only months with at least one filtered record get a column. The
//! percentage is volume weighted (`Σbroken / Σsold`), so a branch selling
//! little cannot dominate the group figure. Cells above the threshold are
//! [`BreakageLevel::High`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::metrics::{breakage_ratio, round_money, BreakageLevel};
use crate::table::{Cell, Table};
use crate::types::{BreakageRecord, DateRange, Selection};

/// Label of the synthetic all-branches row.
pub const GROUP_LABEL: &str = "Grupo";

/// Report table columns, in export order.
pub const REPORT_COLUMNS: [&str; 9] = [
    "Data",
    "Produto",
    "Vendidos",
    "Quebra",
    "% Quebra",
    "Filial",
    "Lucro Bruto",
    "Custo Unitário",
    "Preço Venda Unitário",
];

// =============================================================================
// Filtered report
// =============================================================================

/// Filter of the period report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub branches: Selection,
    pub products: Selection,
    pub range: DateRange,
}

impl ReportFilter {
    pub fn matches(&self, record: &BreakageRecord) -> bool {
        self.range.contains(record.date)
            && self.branches.matches(&record.branch)
            && self.products.matches(&record.product_name)
    }
}

/// One report line: the stored record plus the current catalog prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub record: BreakageRecord,
    pub unit_cost: Option<Decimal>,
    pub unit_sale_price: Option<Decimal>,
}

/// Filtered ledger rows in ledger order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BreakageReport {
    rows: Vec<ReportRow>,
}

impl BreakageReport {
    /// Filters the ledger and left-joins prices by product name.
    ///
    /// Prices are for display only; stored gross profit is left as is.
    pub fn build(ledger: &Ledger, catalog: &Catalog, filter: &ReportFilter) -> Self {
        let rows = ledger
            .records()
            .iter()
            .filter(|r| filter.matches(r))
            .map(|record| {
                let price = catalog.lookup_by_product(&record.product_name);
                ReportRow {
                    record: record.clone(),
                    unit_cost: price.map(|p| p.unit_cost),
                    unit_sale_price: price.map(|p| p.unit_sale_price),
                }
            })
            .collect();

        BreakageReport { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of gross profit, rows without profit contributing nothing.
    pub fn total_gross_profit(&self) -> Decimal {
        self.rows
            .iter()
            .filter_map(|r| r.record.gross_profit)
            .sum()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(REPORT_COLUMNS);
        for row in &self.rows {
            let r = &row.record;
            table.push_row(vec![
                Cell::Date(r.date),
                Cell::text(r.product_name.as_str()),
                Cell::Integer(r.units_sold),
                Cell::Integer(r.units_broken),
                Cell::Decimal(r.breakage_percent),
                Cell::text(r.branch.as_str()),
                Cell::optional_decimal(r.gross_profit),
                Cell::optional_decimal(row.unit_cost),
                Cell::optional_decimal(row.unit_sale_price),
            ]);
        }
        table
    }
}

// =============================================================================
// Monthly dashboard
// =============================================================================

/// Short Portuguese month name (`1 → "jan"`).
pub fn month_label(month: u32) -> &'static str {
    match month {
        1 => "jan",
        2 => "fev",
        3 => "mar",
        4 => "abr",
        5 => "mai",
        6 => "jun",
        7 => "jul",
        8 => "ago",
        9 => "set",
        10 => "out",
        11 => "nov",
        12 => "dez",
        _ => "?",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilter {
    pub branches: Selection,
    pub products: Selection,
    pub year: i32,
}

/// Aggregates of one branch (or the group) in one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCell {
    pub month: u32,
    pub units_broken: u64,
    pub units_sold: u64,
    /// `None` when units broke but none sold.
    pub breakage_percent: Option<Decimal>,
    pub level: BreakageLevel,
    pub gross_profit: Decimal,
}

impl MonthCell {
    fn new(month: u32, units_broken: u64, units_sold: u64, gross_profit: Decimal, threshold: Decimal) -> Self {
        let breakage_percent = breakage_ratio(units_broken, units_sold);
        MonthCell {
            month,
            units_broken,
            units_sold,
            breakage_percent,
            level: BreakageLevel::classify(breakage_percent, threshold),
            gross_profit: round_money(gross_profit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    pub branch: String,
    /// One cell per retained month, same order as [`Dashboard::months`].
    pub cells: Vec<MonthCell>,
}

/// Whole-year group totals ("Totais do Grupo").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupTotals {
    pub units_broken: u64,
    pub units_sold: u64,
    pub gross_profit: Decimal,
}

/// Which value a pivot table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    BreakagePercent,
    UnitsBroken,
    UnitsSold,
    GrossProfit,
}

impl Measure {
    fn cell(self, cell: &MonthCell) -> Cell {
        match self {
            Measure::BreakagePercent => Cell::optional_decimal(cell.breakage_percent),
            Measure::UnitsBroken => Cell::Integer(cell.units_broken),
            Measure::UnitsSold => Cell::Integer(cell.units_sold),
            Measure::GrossProfit => Cell::Decimal(cell.gross_profit),
        }
    }

    fn column_prefix(self) -> &'static str {
        match self {
            Measure::BreakagePercent => "% Quebra",
            Measure::UnitsBroken => "Pond. Quebra",
            Measure::UnitsSold => "Pond. Venda",
            Measure::GrossProfit => "Margem Bruta",
        }
    }

    const ALL: [Measure; 4] = [
        Measure::BreakagePercent,
        Measure::UnitsBroken,
        Measure::UnitsSold,
        Measure::GrossProfit,
    ];
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    broken: u64,
    sold: u64,
    profit: Decimal,
}

/// Branch × month dashboard of one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub year: i32,
    pub threshold: Decimal,
    /// Months present in the filtered data, ascending.
    pub months: Vec<u32>,
    /// One row per branch, sorted by name.
    pub rows: Vec<DashboardRow>,
    /// Column totals across all branches.
    pub group: DashboardRow,
    pub totals: GroupTotals,
}

impl Dashboard {
    /// Aggregates the ledger for the filtered year.
    ///
    /// `threshold` is the percentage above which a cell is flagged high.
    /// Unit sums saturate at `u64::MAX`.
    pub fn build(ledger: &Ledger, filter: &DashboardFilter, threshold: Decimal) -> Self {
        let mut buckets: BTreeMap<(String, u32), Bucket> = BTreeMap::new();
        let mut months = BTreeSet::new();
        let mut branches = BTreeSet::new();

        for record in ledger.records().iter().filter(|r| {
            r.date.year() == filter.year
                && filter.branches.matches(&r.branch)
                && filter.products.matches(&r.product_name)
        }) {
            let month = record.date.month();
            months.insert(month);
            branches.insert(record.branch.clone());

            let bucket = buckets.entry((record.branch.clone(), month)).or_default();
            bucket.broken = bucket.broken.saturating_add(record.units_broken);
            bucket.sold = bucket.sold.saturating_add(record.units_sold);
            bucket.profit += record.gross_profit.unwrap_or_default();
        }

        let months: Vec<u32> = months.into_iter().collect();

        let rows: Vec<DashboardRow> = branches
            .into_iter()
            .map(|branch| {
                let cells = months
                    .iter()
                    .map(|&m| {
                        let b = buckets.get(&(branch.clone(), m)).copied().unwrap_or_default();
                        MonthCell::new(m, b.broken, b.sold, b.profit, threshold)
                    })
                    .collect();
                DashboardRow { branch, cells }
            })
            .collect();

        let group_cells: Vec<MonthCell> = months
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                let (broken, sold, profit) = rows.iter().map(|r| &r.cells[i]).fold(
                    (0u64, 0u64, Decimal::ZERO),
                    |(b, s, p), c| {
                        (
                            b.saturating_add(c.units_broken),
                            s.saturating_add(c.units_sold),
                            p + c.gross_profit,
                        )
                    },
                );
                MonthCell::new(m, broken, sold, profit, threshold)
            })
            .collect();

        let totals = GroupTotals {
            units_broken: group_cells.iter().fold(0u64, |acc, c| acc.saturating_add(c.units_broken)),
            units_sold: group_cells.iter().fold(0u64, |acc, c| acc.saturating_add(c.units_sold)),
            gross_profit: group_cells.iter().map(|c| c.gross_profit).sum(),
        };

        Dashboard {
            year: filter.year,
            threshold,
            months,
            rows,
            group: DashboardRow {
                branch: GROUP_LABEL.to_string(),
                cells: group_cells,
            },
            totals,
        }
    }

    /// True when the filter selected no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Branch rows followed by the group row.
    pub fn all_rows(&self) -> impl Iterator<Item = &DashboardRow> {
        self.rows.iter().chain(std::iter::once(&self.group))
    }

    /// One measure as `Filial × month` table, group row last.
    pub fn pivot(&self, measure: Measure) -> Table {
        let mut table = Table::new(
            std::iter::once("Filial".to_string()).chain(self.months.iter().map(|&m| month_label(m).to_string())),
        );
        for row in self.all_rows() {
            let mut cells = vec![Cell::text(row.branch.as_str())];
            cells.extend(row.cells.iter().map(|c| measure.cell(c)));
            table.push_row(cells);
        }
        table
    }

    /// All four measures side by side, month by month.
    pub fn consolidated_table(&self) -> Table {
        let mut columns = vec!["Filial".to_string()];
        for &m in &self.months {
            for measure in Measure::ALL {
                columns.push(format!("{} ({})", measure.column_prefix(), month_label(m)));
            }
        }

        let mut table = Table::new(columns);
        for row in self.all_rows() {
            let mut cells = vec![Cell::text(row.branch.as_str())];
            for cell in &row.cells {
                cells.extend(Measure::ALL.iter().map(|measure| measure.cell(cell)));
            }
            table.push_row(cells);
        }
        table
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriceEntry, RecordId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(y: i32, m: u32, product: &str, branch: &str, sold: u64, broken: u64, profit: Option<Decimal>) -> BreakageRecord {
        BreakageRecord {
            id: RecordId::new(),
            date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            product_name: product.to_string(),
            units_sold: sold,
            units_broken: broken,
            breakage_percent: crate::metrics::compute_breakage_percent(sold, broken),
            branch: branch.to_string(),
            gross_profit: profit,
        }
    }

    fn ledger() -> Ledger {
        Ledger::from_records(vec![
            record(2024, 1, "Coxinha", "Centro", 90, 10, Some(dec!(125))),
            record(2024, 1, "Quibe", "Centro", 10, 0, None),
            record(2024, 1, "Coxinha", "Norte", 50, 2, Some(dec!(73))),
            record(2024, 3, "Coxinha", "Norte", 0, 4, Some(dec!(-4))),
            record(2023, 12, "Coxinha", "Sul", 100, 1, Some(dec!(149))),
        ])
    }

    fn year_filter(year: i32) -> DashboardFilter {
        DashboardFilter {
            branches: Selection::All,
            products: Selection::All,
            year,
        }
    }

    #[test]
    fn test_report_filters_and_joins() {
        let catalog = Catalog::from_entries(vec![PriceEntry::new("001", "Coxinha", dec!(1.00), dec!(2.50))]);
        let filter = ReportFilter {
            branches: Selection::only(["Centro"]),
            products: Selection::All,
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .unwrap(),
        };

        let report = BreakageReport::build(&ledger(), &catalog, &filter);

        assert_eq!(report.len(), 2);
        assert_eq!(report.rows()[0].unit_cost, Some(dec!(1.00)));
        assert_eq!(report.rows()[1].unit_cost, None);
        assert_eq!(report.total_gross_profit(), dec!(125));

        let table = report.to_table();
        assert_eq!(table.columns(), REPORT_COLUMNS);
        assert_eq!(table.cell(1, "Lucro Bruto"), Some(&Cell::Empty));
    }

    #[test]
    fn test_report_empty_selection_matches_nothing() {
        let filter = ReportFilter {
            branches: Selection::only(Vec::<String>::new()),
            products: Selection::All,
            range: DateRange::new(NaiveDate::MIN, NaiveDate::MAX).unwrap(),
        };
        assert!(BreakageReport::build(&ledger(), &Catalog::default(), &filter).is_empty());
    }

    #[test]
    fn test_dashboard_months_and_branches() {
        let dashboard = Dashboard::build(&ledger(), &year_filter(2024), dec!(8));

        assert_eq!(dashboard.months, vec![1, 3]);
        let branches: Vec<_> = dashboard.rows.iter().map(|r| r.branch.as_str()).collect();
        assert_eq!(branches, vec!["Centro", "Norte"]);

        let centro_jan = dashboard.rows[0].cells[0];
        assert_eq!((centro_jan.units_broken, centro_jan.units_sold), (10, 100));
        assert_eq!(centro_jan.breakage_percent, Some(dec!(10)));
        assert_eq!(centro_jan.level, BreakageLevel::High);
        assert_eq!(centro_jan.gross_profit, dec!(125));

        // Centro has nothing in March
        let centro_mar = dashboard.rows[0].cells[1];
        assert_eq!(centro_mar.breakage_percent, Some(Decimal::ZERO));
        assert_eq!(centro_mar.level, BreakageLevel::Normal);

        let norte_mar = dashboard.rows[1].cells[1];
        assert_eq!(norte_mar.breakage_percent, None);
        assert_eq!(norte_mar.level, BreakageLevel::NoSales);
    }

    #[test]
    fn test_group_row_sums_branches() {
        let dashboard = Dashboard::build(&ledger(), &year_filter(2024), dec!(8));

        for (i, group_cell) in dashboard.group.cells.iter().enumerate() {
            let broken: u64 = dashboard.rows.iter().map(|r| r.cells[i].units_broken).sum();
            assert_eq!(group_cell.units_broken, broken);
        }

        let jan = dashboard.group.cells[0];
        assert_eq!((jan.units_broken, jan.units_sold), (12, 150));
        assert_eq!(jan.breakage_percent, Some(dec!(8)));
        assert_eq!(jan.level, BreakageLevel::Normal);

        assert_eq!(dashboard.totals.units_broken, 16);
        assert_eq!(dashboard.totals.units_sold, 150);
        assert_eq!(dashboard.totals.gross_profit, dec!(194));
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let ledger = Ledger::from_records(vec![
            record(2024, 1, "Coxinha", "Centro", 0, u64::MAX, None),
            record(2024, 1, "Coxinha", "Centro", 0, 1, None),
            record(2024, 1, "Coxinha", "Norte", 0, 5, None),
        ]);
        let dashboard = Dashboard::build(&ledger, &year_filter(2024), dec!(8));

        assert_eq!(dashboard.rows[0].cells[0].units_broken, u64::MAX);
        assert_eq!(dashboard.group.cells[0].units_broken, u64::MAX);
        assert_eq!(dashboard.totals.units_broken, u64::MAX);
        assert_eq!(dashboard.group.cells[0].level, BreakageLevel::NoSales);
    }

    #[test]
    fn test_pivot_and_consolidated_tables() {
        let dashboard = Dashboard::build(&ledger(), &year_filter(2024), dec!(8));

        let pivot = dashboard.pivot(Measure::UnitsSold);
        assert_eq!(pivot.columns(), ["Filial", "jan", "mar"]);
        assert_eq!(pivot.len(), 3);
        assert_eq!(pivot.cell(2, "Filial"), Some(&Cell::text(GROUP_LABEL)));
        assert_eq!(pivot.cell(2, "jan"), Some(&Cell::Integer(150)));

        let consolidated = dashboard.consolidated_table();
        assert_eq!(consolidated.columns().len(), 1 + 2 * 4);
        assert_eq!(consolidated.columns()[1], "% Quebra (jan)");
        assert_eq!(
            consolidated.cell(1, "% Quebra (mar)"),
            Some(&Cell::Empty)
        );
        assert_eq!(
            consolidated.cell(0, "Margem Bruta (jan)"),
            Some(&Cell::Decimal(dec!(125)))
        );
    }

    #[test]
    fn test_dashboard_empty_year() {
        let dashboard = Dashboard::build(&ledger(), &year_filter(2030), dec!(8));
        assert!(dashboard.is_empty());
        assert!(dashboard.months.is_empty());
        assert_eq!(dashboard.consolidated_table().len(), 1);
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label(1), "jan");
        assert_eq!(month_label(9), "set");
        assert_eq!(month_label(12), "dez");
    }
}
