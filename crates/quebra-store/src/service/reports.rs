//! # Report Service
//!
//! Read-only views: the filtered report, the monthly dashboard, the values
//! the presentation layer offers in its selectors, and table export.

use std::path::Path;

use quebra_core::report::{BreakageReport, Dashboard, DashboardFilter, ReportFilter};
use quebra_core::Table;
use tracing::debug;

use crate::error::StoreResult;
use crate::export::{export_to, write_table, ExportFormat};
use crate::state::AppState;

#[derive(Debug)]
pub struct ReportService<'a> {
    state: &'a AppState,
}

impl<'a> ReportService<'a> {
    pub(crate) fn new(state: &'a AppState) -> Self {
        ReportService { state }
    }

    /// Ledger rows matching the filter, with current catalog prices.
    pub fn report(&self, filter: &ReportFilter) -> BreakageReport {
        let report = BreakageReport::build(self.state.ledger(), self.state.catalog(), filter);
        debug!(rows = report.len(), "Report built");
        report
    }

    /// Branch × month dashboard using the configured threshold.
    pub fn dashboard(&self, filter: &DashboardFilter) -> Dashboard {
        let dashboard = Dashboard::build(
            self.state.ledger(),
            filter,
            self.state.config().high_breakage_threshold,
        );
        debug!(
            year = filter.year,
            branches = dashboard.rows.len(),
            months = dashboard.months.len(),
            "Dashboard built"
        );
        dashboard
    }

    /// Branches present in the ledger, sorted.
    pub fn branches(&self) -> Vec<String> {
        self.state.ledger().branches()
    }

    /// Products present in the ledger, sorted.
    pub fn products(&self) -> Vec<String> {
        self.state.ledger().products()
    }

    /// Years present in the ledger, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.state.ledger().years()
    }

    /// Writes a table as `.csv` or `.xlsx`, chosen by extension.
    pub fn export(&self, table: &Table, path: &Path) -> StoreResult<ExportFormat> {
        export_to(table, path)
    }

    /// Writes a table in an explicit format.
    pub fn export_as(&self, table: &Table, path: &Path, format: ExportFormat) -> StoreResult<()> {
        write_table(table, path, format)
    }
}
