//! Rendering helpers shared by the command handlers.

use anyhow::Result;
use quebra_core::{Outcome, Selection, Table};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Warnings go to stderr so stdout stays machine readable.
pub fn print_warnings<T>(outcome: &Outcome<T>) {
    if !outcome.has_warnings() {
        return;
    }
    for warning in &outcome.warnings {
        eprintln!("aviso: {warning}");
    }
}

/// Column-aligned text rendering of a table.
pub fn render_table(table: &Table) {
    for line in table_lines(table) {
        println!("{line}");
    }
}

fn table_lines(table: &Table) -> Vec<String> {
    let rendered: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    for row in &rendered {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let pad = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rendered.len() + 2);
    lines.push(pad(table.columns()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rendered.iter().map(|row| pad(row)));
    lines
}

pub fn format_money(value: Decimal) -> String {
    format!("R$ {:.2}", value)
}

/// No values on the command line means every value.
pub fn selection(values: Vec<String>) -> Selection {
    if values.is_empty() {
        Selection::All
    } else {
        Selection::only(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quebra_core::Cell;
    use rust_decimal_macros::dec;

    #[test]
    fn test_table_lines_align_columns() {
        let mut table = Table::new(["Filial", "jan"]);
        table.push_row(vec![Cell::text("Centro"), Cell::Decimal(dec!(8.33))]);
        table.push_row(vec![Cell::text("Grupo"), Cell::Empty]);

        let lines = table_lines(&table);
        assert_eq!(lines[0], "Filial  jan");
        assert_eq!(lines[1], "------  ----");
        assert_eq!(lines[2], "Centro  8.33");
        assert_eq!(lines[3], "Grupo");
    }

    #[test]
    fn test_money_format() {
        assert_eq!(format_money(dec!(125)), "R$ 125.00");
        assert_eq!(format_money(dec!(-3.5)), "R$ -3.50");
    }

    #[test]
    fn test_empty_selection_means_all() {
        assert_eq!(selection(Vec::new()), Selection::All);
        assert!(selection(vec!["Centro".into()]).matches("Centro"));
        assert!(!selection(vec!["Centro".into()]).matches("Norte"));
    }
}
