//! # Command Handlers
//!
//! One module per command group. Each handler takes the opened
//! [`AppState`](quebra_store::AppState), calls a single service and renders
//! the result as text or JSON.

pub mod import;
pub mod price;
pub mod record;
pub mod report;

pub use import::ImportArgs;
pub use price::PriceCommands;
pub use record::RecordCommands;
pub use report::{DashboardArgs, ReportArgs};
