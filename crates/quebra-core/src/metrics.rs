//! # Metrics Engine
//!
//! Pure functions deriving breakage percentage and gross profit.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  f64:      2.50 × 90 − 1.10 × 100 = 114.99999999999999  ❌             │
//! │  Decimal:  2.50 × 90 − 1.10 × 100 = 115.00              ✅             │
//! │                                                                         │
//! │  Every cost, price, profit and percentage is a rust_decimal::Decimal.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Percentages are rounded to 2 decimal places with banker's rounding
//! (`MidpointNearestEven`): `0.0125 → 0.01`, `0.0375 → 0.04`.
//! Gross profit is never rounded when stored.
//!
//! Record creation, record edit and spreadsheet import all go through
//! [`compute_breakage_percent`] and [`compute_gross_profit`], so the three
//! paths always agree to the last digit.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::PriceEntry;

/// Decimal places kept on every percentage.
pub const PERCENT_DECIMALS: u32 = 2;

/// Rounds a percentage the one way the whole crate rounds.
#[inline]
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_DECIMALS, RoundingStrategy::MidpointNearestEven)
}

/// Rounds an aggregated money amount (dashboard cells) to centavos.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Share of broken units over everything produced.
///
/// `broken / (sold + broken) × 100`, rounded to 2 decimals.
/// Returns 0 when nothing was sold or broken.
///
/// ## Example
/// ```rust
/// use quebra_core::metrics::compute_breakage_percent;
/// use rust_decimal::Decimal;
///
/// assert_eq!(compute_breakage_percent(90, 10), Decimal::new(1000, 2));
/// assert_eq!(compute_breakage_percent(0, 0), Decimal::ZERO);
/// ```
pub fn compute_breakage_percent(sold: u64, broken: u64) -> Decimal {
    let total = Decimal::from(sold) + Decimal::from(broken);
    if total.is_zero() {
        return Decimal::ZERO;
    }
    round_percent(Decimal::from(broken) * Decimal::ONE_HUNDRED / total)
}

/// Gross profit after breakage.
///
/// `sale_price × sold − cost × (sold + broken)`; `None` without a price.
/// Can be negative when breakage eats the margin.
pub fn compute_gross_profit(price: Option<&PriceEntry>, sold: u64, broken: u64) -> Option<Decimal> {
    let price = price?;
    let sold = Decimal::from(sold);
    let produced = sold + Decimal::from(broken);
    Some(price.unit_sale_price * sold - price.unit_cost * produced)
}

/// Both derived values of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMetrics {
    pub breakage_percent: Decimal,
    pub gross_profit: Option<Decimal>,
}

impl RecordMetrics {
    pub fn derive(price: Option<&PriceEntry>, sold: u64, broken: u64) -> Self {
        RecordMetrics {
            breakage_percent: compute_breakage_percent(sold, broken),
            gross_profit: compute_gross_profit(price, sold, broken),
        }
    }
}

// =============================================================================
// Aggregated breakage ratio (dashboard)
// =============================================================================

/// Volume-weighted breakage of an aggregate: `Σbroken / Σsold × 100`.
///
/// `None` when nothing was sold, since the ratio is undefined there.
pub fn breakage_ratio(total_broken: u64, total_sold: u64) -> Option<Decimal> {
    if total_sold == 0 {
        return if total_broken == 0 {
            Some(Decimal::ZERO)
        } else {
            None
        };
    }
    Some(round_percent(
        Decimal::from(total_broken) * Decimal::ONE_HUNDRED / Decimal::from(total_sold),
    ))
}

/// Alert level of an aggregated breakage cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BreakageLevel {
    /// At or below the threshold.
    Normal,
    /// Above the threshold.
    High,
    /// Units broke but none sold.
    NoSales,
}

impl BreakageLevel {
    /// Classifies a ratio from [`breakage_ratio`] against `threshold` percent.
    pub fn classify(ratio: Option<Decimal>, threshold: Decimal) -> Self {
        match ratio {
            None => BreakageLevel::NoSales,
            Some(value) if value > threshold => BreakageLevel::High,
            Some(_) => BreakageLevel::Normal,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
