//! # Services
//!
//! Operation entry points for the presentation layer. Each call is one
//! complete read-modify-write cycle over [`AppState`](crate::AppState).
//!
//! - [`RecordService`] - create, edit, delete, purge, list
//! - [`PriceService`] - price upsert, edit, delete, list
//! - [`ImportService`] - spreadsheet import
//! - [`ReportService`] - filtered report, dashboard, selector sources, export

pub mod import;
pub mod prices;
pub mod records;
pub mod reports;

pub use import::{ImportService, ImportSummary};
pub use prices::PriceService;
pub use records::{DeletedRecord, RecordService};
pub use reports::ReportService;

use quebra_core::Warning;
use tracing::warn;

/// Logs every warning attached to a successful result.
pub(crate) fn log_warnings(operation: &str, warnings: &[Warning]) {
    for warning in warnings {
        warn!(operation, %warning, "Operation completed with warning");
    }
}
