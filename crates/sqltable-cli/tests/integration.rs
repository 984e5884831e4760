//! Integration tests for the sqltable CLI commands
//!
//! The command functions are driven directly; fixtures are written into a
//! temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use sqltable_cli::{import_command, load_settings, query_command, render_command, OutputFormat, QueryArgs};
use sqltable_core::Settings;
use tempfile::TempDir;

fn write_book(dir: &Path) -> PathBuf {
    let path = dir.join("book.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("People").unwrap();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Age").unwrap();
    sheet.write_string(1, 0, "Ann").unwrap();
    sheet.write_number(1, 1, 30).unwrap();
    sheet.write_string(2, 0, "Bo").unwrap();
    sheet.write_number(2, 1, 41).unwrap();

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Title").unwrap();
    notes.write_string(1, 0, "Draft").unwrap();
    notes.write_string(2, 0, "Final").unwrap();

    workbook.save(&path).unwrap();
    path
}

#[test]
fn test_import_into_database_file() {
    let dir = TempDir::new().unwrap();
    let book = write_book(dir.path());
    let db = dir.path().join("book.sqlite");

    let report = import_command(&book, Some(&db), None, &Settings::default()).unwrap();
    assert_eq!(report.rows_for("People"), Some(2));
    assert_eq!(report.rows_for("Notes"), Some(2));
    assert_eq!(report.total_rows(), 4);
    assert!(db.exists());

    // the database can be queried with the sqlite driver afterwards
    let args = QueryArgs {
        sql: "SELECT name FROM People WHERE age > 35".to_string(),
        ..Default::default()
    };
    let table = query_command(&db, &args, &Settings::default()).unwrap();
    assert_eq!(table, "[cols=\"1\"]\n|===\n| Bo\n|===\n");
}

#[test]
fn test_import_twice_into_same_database_fails() {
    let dir = TempDir::new().unwrap();
    let book = write_book(dir.path());
    let db = dir.path().join("book.sqlite");

    import_command(&book, Some(&db), None, &Settings::default()).unwrap();
    let err = import_command(&book, Some(&db), None, &Settings::default()).unwrap_err();
    assert!(format!("{err:#}").contains("already exists"));
}

#[test]
fn test_import_csv_with_header_row() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("sales.csv");
    fs::write(&csv, "Quarterly sales,\nRegion,Total\nNorth,10\nSouth,12\n").unwrap();

    let report = import_command(&csv, None, Some(1), &Settings::default()).unwrap();
    assert_eq!(report.rows_for("sales"), Some(2));
}

#[test]
fn test_import_missing_input() {
    let err = import_command(
        Path::new("/nonexistent/book.xlsx"),
        None,
        None,
        &Settings::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_query_xlsx_with_options() {
    let dir = TempDir::new().unwrap();
    let book = write_book(dir.path());

    let args = QueryArgs {
        sql: "SELECT name, age FROM People ORDER BY age".to_string(),
        header: Some("Name, Age".to_string()),
        widths: Some("3 1".to_string()),
        stub_columns: 1,
        title: Some("Staff".to_string()),
        class: Some("compact".to_string()),
        ..Default::default()
    };
    let table = query_command(&book, &args, &Settings::default()).unwrap();

    let expected = "\
.Staff
[cols=\"3h,1\",options=\"header\",role=\"compact\"]
|===
| Name
| Age

| Ann
| 30

| Bo
| 41
|===
";
    assert_eq!(table, expected);
}

#[test]
fn test_query_rejects_bad_options() {
    let dir = TempDir::new().unwrap();
    let book = write_book(dir.path());

    let bad_driver = QueryArgs {
        sql: "SELECT 1".to_string(),
        driver: Some("oracle".to_string()),
        ..Default::default()
    };
    assert!(query_command(&book, &bad_driver, &Settings::default()).is_err());

    let bad_widths = QueryArgs {
        sql: "SELECT name FROM People".to_string(),
        widths: Some("1 1".to_string()),
        ..Default::default()
    };
    assert!(query_command(&book, &bad_widths, &Settings::default()).is_err());
}

#[test]
fn test_render_writes_output() {
    let dir = TempDir::new().unwrap();
    write_book(dir.path());
    let input = dir.path().join("report.adoc");
    let output = dir.path().join("report.out.adoc");
    fs::write(
        &input,
        "= Report\n\n.. sql-table:: People\n   :source: book.xlsx\n   :sql: SELECT count(*) FROM People\n\nEnd.\n",
    )
    .unwrap();

    let rendered = render_command(
        &input,
        Some(&output),
        OutputFormat::Json,
        true,
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(rendered.directives, 1);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "= Report\n\n.People\n[cols=\"1\"]\n|===\n| 2\n|===\n\nEnd.\n"
    );
}

#[test]
fn test_render_strict_fails_on_broken_directive() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.adoc");
    let output = dir.path().join("out.adoc");
    fs::write(&input, ".. sql-table::\n   :source: missing.xlsx\n   :sql: SELECT 1\n").unwrap();

    let settings = Settings::default();
    let lenient = render_command(&input, Some(&output), OutputFormat::Text, false, &settings)
        .unwrap();
    assert!(lenient.diagnostics.has_errors());
    let diag = lenient.diagnostics.iter().next().unwrap();
    assert_eq!(diag.file.as_deref(), Some(input.display().to_string().as_str()));

    let err = render_command(&input, Some(&output), OutputFormat::Text, true, &settings)
        .unwrap_err();
    assert!(err.to_string().contains("1 of 1 directive(s) failed"));
    // the document is still written before failing
    assert!(fs::read_to_string(&output).unwrap().contains("...."));
}

#[test]
fn test_load_settings() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[log]\nlevel = \"debug\"\n").unwrap();

    let settings = load_settings(Some(&config), dir.path()).unwrap();
    assert_eq!(settings.log.level, "debug");

    let discovered = load_settings(None, dir.path()).unwrap();
    assert_eq!(discovered.log.level, "info");

    assert!(load_settings(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
}
