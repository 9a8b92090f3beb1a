//! End-to-end operations against a temporary data directory.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::NaiveDate;
use quebra_core::import::ImportBatch;
use quebra_core::report::{DashboardFilter, ReportFilter};
use quebra_core::{DateRange, PriceEntry, RecordDraft, Selection, Warning};
use quebra_store::{AppState, ErrorKind, StoreConfig};
use rust_decimal_macros::dec;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(dir: &TempDir) -> AppState {
    AppState::open(StoreConfig::new(dir.path())).unwrap()
}

fn with_coxinha_price(state: &mut AppState) {
    state
        .prices()
        .upsert(PriceEntry::new("001", "Coxinha", dec!(1.00), dec!(2.50)))
        .unwrap();
}

fn draft(product: &str, branch: &str, sold: u64, broken: u64) -> RecordDraft {
    RecordDraft {
        date: date(2024, 3, 1),
        product_name: product.to_string(),
        units_sold: sold,
        units_broken: broken,
        branch: branch.to_string(),
    }
}

fn batch(branch: &str, month: u32) -> ImportBatch {
    ImportBatch {
        branch: branch.to_string(),
        month,
        year: 2024,
    }
}

fn write_source(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn ledger_path(dir: &TempDir) -> PathBuf {
    dir.path().join("dados_quebras.csv")
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);

    let priced = state.records().create(draft("Coxinha", "Centro", 90, 10)).unwrap();
    assert!(!priced.has_warnings());

    let unpriced = state.records().create(draft("Esfiha", "Centro", 20, 2)).unwrap();
    assert_eq!(
        unpriced.warnings,
        vec![Warning::MissingPrice {
            product: "Esfiha".to_string()
        }]
    );

    let reopened = open(&dir);
    assert_eq!(reopened.ledger(), state.ledger());
    assert_eq!(reopened.ledger().records()[0].gross_profit, Some(dec!(125)));
    assert_eq!(reopened.ledger().records()[1].gross_profit, None);
}

#[test]
fn test_create_rejects_blank_branch_without_writing() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);

    let err = state.records().create(draft("Coxinha", " ", 1, 1)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "Filial é obrigatório");
    assert!(!ledger_path(&dir).exists());
}

#[test]
fn test_update_recomputes_metrics() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);

    let id = state.records().create(draft("Coxinha", "Centro", 90, 10)).unwrap().value.id;
    let updated = state.records().update(id, draft("Coxinha", "Centro", 75, 25)).unwrap().value;

    assert_eq!(updated.id, id);
    assert_eq!(updated.breakage_percent, dec!(25));
    assert_eq!(updated.gross_profit, Some(dec!(87.50)));
    assert_eq!(open(&dir).ledger().get(id), Some(&updated));
}

#[test]
fn test_single_delete_writes_backup() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    let keep = state.records().create(draft("Coxinha", "Centro", 1, 0)).unwrap().value;
    let gone = state.records().create(draft("Coxinha", "Centro", 1, 0)).unwrap().value;
    let before = read(&ledger_path(&dir));

    let deleted = state.records().delete(gone.id).unwrap();

    let backup = deleted.backup.expect("backup written");
    assert!(backup.starts_with(dir.path().join("backups")));
    assert_eq!(read(&backup), before);
    assert_eq!(open(&dir).ledger().records(), [keep]);
}

#[test]
fn test_delete_unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    state.records().create(draft("Coxinha", "Centro", 1, 0)).unwrap();

    let err = state.records().delete(quebra_core::RecordId::new()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!dir.path().join("backups").exists());
    assert_eq!(state.ledger().len(), 1);
}

#[test]
fn test_purge_with_no_matches_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    state.records().create(draft("Coxinha", "Centro", 1, 0)).unwrap();
    let before = read(&ledger_path(&dir));

    let range = DateRange::new(date(2023, 1, 1), date(2023, 12, 31)).unwrap();
    let removed = state.records().delete_by_filter(range, &Selection::All).unwrap();

    assert_eq!(removed, 0);
    assert_eq!(read(&ledger_path(&dir)), before);
    assert!(!dir.path().join("backups").exists());
}

#[test]
fn test_purge_by_period_and_branch() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    state.records().create(draft("Coxinha", "Centro", 1, 0)).unwrap();
    state.records().create(draft("Coxinha", "Norte", 1, 0)).unwrap();

    let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
    let removed = state
        .records()
        .delete_by_filter(range, &Selection::only(["Norte"]))
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(open(&dir).reports().branches(), vec!["Centro"]);
}

#[test]
fn test_failed_write_leaves_memory_untouched() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blocker"), "not a directory").unwrap();
    let config = StoreConfig::new(dir.path()).ledger_file("blocker/dados.csv");
    let mut state = AppState::open(config).unwrap();

    let err = state.records().create(draft("Coxinha", "Centro", 1, 0)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(state.ledger().is_empty());
}

// =============================================================================
// Prices
// =============================================================================

#[test]
fn test_price_not_above_cost_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);
    let catalog_file = dir.path().join("precos.csv");
    let before = read(&catalog_file);

    let err = state
        .prices()
        .upsert(PriceEntry::new("001", "Coxinha", dec!(3.00), dec!(2.50)))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(read(&catalog_file), before);
    assert_eq!(state.catalog().entries()[0].unit_sale_price, dec!(2.50));
}

#[test]
fn test_price_changes_do_not_rewrite_ledger() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);
    state.records().create(draft("Coxinha", "Centro", 90, 10)).unwrap();

    state
        .prices()
        .upsert(PriceEntry::new("001", "Coxinha", dec!(2.00), dec!(5.00)))
        .unwrap();
    assert_eq!(state.prices().delete("Coxinha").unwrap(), 1);

    assert_eq!(state.ledger().records()[0].gross_profit, Some(dec!(125)));
    assert_eq!(state.prices().delete("Coxinha").unwrap_err().kind(), ErrorKind::NotFound);
}

// =============================================================================
// Import
// =============================================================================

const SOURCE: &str = "CÓD. VIP,DESCRIÇÃO,ESTOQUE,QUEBRA,VENDA\n\
                      001,Coxinha,5,4,40\n\
                      003,Esfiha,2,1,10\n\
                      001,Coxinha,5,6,50\n";

#[test]
fn test_import_scenario() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);
    let source = write_source(&dir, "quebras.csv", SOURCE);

    let outcome = state.imports().import(&source, &batch("Centro", 3)).unwrap();

    let summary = &outcome.value;
    assert_eq!(summary.appended, 1);
    assert_eq!(summary.source_rows, 3);
    assert_eq!(summary.aggregated_rows, 2);
    assert_eq!(summary.skipped_products, vec!["Esfiha"]);
    assert!(outcome.warnings.contains(&Warning::UnpricedProductsSkipped {
        products: vec!["Esfiha".to_string()]
    }));

    let ledger = open(&dir).ledger().clone();
    let record = &ledger.records()[0];
    assert_eq!(record.date, date(2024, 3, 1));
    assert_eq!(record.branch, "Centro");
    assert_eq!(record.breakage_percent, dec!(10.00));
    assert_eq!(record.gross_profit, Some(dec!(125)));
}

#[test]
fn test_import_twice_appends_twice() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);
    let source = write_source(&dir, "quebras.csv", SOURCE);

    state.imports().import(&source, &batch("Centro", 3)).unwrap();
    state.imports().import(&source, &batch("Centro", 3)).unwrap();

    let records = open(&dir).ledger().records().to_vec();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);
}

#[test]
fn test_import_of_unpriced_only_does_not_write() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    let source = write_source(&dir, "quebras.csv", "CÓD. VIP,DESCRIÇÃO,QUEBRA,VENDA\n9,Pastel,1,9\n");

    let outcome = state.imports().import(&source, &batch("Centro", 3)).unwrap();

    assert_eq!(outcome.value.appended, 0);
    assert_eq!(outcome.value.skipped_products, vec!["Pastel"]);
    assert!(!ledger_path(&dir).exists());
}

#[test]
fn test_import_preconditions_and_schema() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    let source = write_source(&dir, "quebras.csv", "CÓD. VIP,PRODUTO,QUEBRA,VENDA\n1,Coxinha,1,9\n");

    let err = state.imports().import(&source, &batch("", 3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = state
        .imports()
        .import(&dir.path().join("missing.xlsx"), &batch("Centro", 3))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = state.imports().import(&source, &batch("Centro", 3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.to_string(), "A planilha deve conter a coluna 'DESCRIÇÃO'");
    assert!(state.ledger().is_empty());
}

#[test]
fn test_import_from_xlsx_with_numeric_codes() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);

    let path = dir.path().join("quebras.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in [" cód. vip", "Descrição", "Quebra", "Venda"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_number(1, 0, 1.0).unwrap();
    sheet.write_string(1, 1, "Coxinha").unwrap();
    sheet.write_number(1, 2, 10.0).unwrap();
    sheet.write_number(1, 3, 90.0).unwrap();
    workbook.save(&path).unwrap();

    let outcome = state.imports().import(&path, &batch("Norte", 7)).unwrap();

    assert_eq!(outcome.value.appended, 1);
    let record = &state.ledger().records()[0];
    assert_eq!((record.units_broken, record.units_sold), (10, 90));
    assert_eq!(record.date, date(2024, 7, 1));
    assert_eq!(record.gross_profit, Some(dec!(125)));
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_report_export_round_trips_through_xlsx() {
    let dir = TempDir::new().unwrap();
    let mut state = open(&dir);
    with_coxinha_price(&mut state);
    state.records().create(draft("Coxinha", "Centro", 90, 10)).unwrap();
    state.records().create(draft("Esfiha", "Centro", 20, 0)).unwrap();

    let filter = ReportFilter {
        branches: Selection::All,
        products: Selection::All,
        range: DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap(),
    };
    let report = state.reports().report(&filter);
    assert_eq!(report.total_gross_profit(), dec!(125));

    let table = report.to_table();
    let xlsx_path = dir.path().join("relatorio.xlsx");
    state.reports().export(&table, &xlsx_path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(read(&xlsx_path))).unwrap();
    let range = workbook.worksheet_range("Relatorio").unwrap();

    let headers: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
    assert_eq!(headers, table.columns());
    assert_eq!(range.get_value((1, 1)), Some(&Data::String("Coxinha".to_string())));
    assert_eq!(range.get_value((1, 6)), Some(&Data::Float(125.0)));
    assert_eq!(range.height(), 3);

    let csv_path = dir.path().join("relatorio.csv");
    state.reports().export(&table, &csv_path).unwrap();
    let text = fs::read_to_string(csv_path).unwrap();
    assert!(text.starts_with("Data,Produto,Vendidos,Quebra,% Quebra,Filial,Lucro Bruto"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_dashboard_uses_configured_threshold() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::new(dir.path()).high_breakage_threshold(dec!(12));
    let mut state = AppState::open(config).unwrap();
    state.records().create(draft("Coxinha", "Centro", 90, 10)).unwrap();

    let dashboard = state.reports().dashboard(&DashboardFilter {
        branches: Selection::All,
        products: Selection::All,
        year: 2024,
    });

    assert_eq!(dashboard.months, vec![3]);
    let cell = dashboard.rows[0].cells[0];
    assert_eq!(cell.breakage_percent, Some(dec!(11.11)));
    assert_eq!(cell.level, quebra_core::BreakageLevel::Normal);
    assert_eq!(state.reports().years(), vec![2024]);
}
