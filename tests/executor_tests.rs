// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl2sql_assistant::executor::{DataSource, Scalar, SqliteDataSource};
use tempfile::TempDir;

fn seeded() -> (TempDir, SqliteDataSource) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE items (item_name TEXT, qty INTEGER, price REAL, photo BLOB);
         INSERT INTO items VALUES ('rice', 40, 55.5, NULL);
         INSERT INTO items VALUES ('sugar', 12, 42.0, x'0102');
         INSERT INTO items VALUES ('salt', 7, NULL, NULL);"
    )
    .unwrap();
    (dir, SqliteDataSource::new(&path))
}

#[test]
fn test_execute_returns_columns_and_rows_in_order() {
    let (_dir, source) = seeded();
    let result = source
        .execute("SELECT item_name, qty FROM items ORDER BY qty DESC")
        .unwrap();
    assert_eq!(result.columns, vec!["item_name", "qty"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Scalar::Text("rice".into()), Scalar::Integer(40)],
            vec![Scalar::Text("sugar".into()), Scalar::Integer(12)],
            vec![Scalar::Text("salt".into()), Scalar::Integer(7)],
        ]
    );
}

#[test]
fn test_execute_maps_value_types() {
    let (_dir, source) = seeded();
    let result = source
        .execute("SELECT price, photo FROM items WHERE item_name = 'sugar'")
        .unwrap();
    assert_eq!(
        result.rows[0],
        vec![Scalar::Real(42.0), Scalar::Blob(vec![1, 2])]
    );
    let result = source
        .execute("SELECT price FROM items WHERE item_name = 'salt'")
        .unwrap();
    assert_eq!(result.rows[0], vec![Scalar::Null]);
}

#[test]
fn test_execute_empty_result_keeps_columns() {
    let (_dir, source) = seeded();
    let result = source
        .execute("SELECT item_name FROM items WHERE qty > 1000")
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.columns, vec!["item_name"]);
}

#[test]
fn test_modifying_statements_are_rolled_back() {
    let (_dir, source) = seeded();
    source.execute("DELETE FROM items").unwrap();
    source
        .execute("UPDATE items SET qty = 0 WHERE item_name = 'rice'")
        .unwrap();
    let result = source
        .execute("SELECT COUNT(*), SUM(qty) FROM items")
        .unwrap();
    assert_eq!(result.rows[0], vec![Scalar::Integer(3), Scalar::Integer(59)]);
}

#[test]
fn test_execute_unknown_table_fails() {
    let (_dir, source) = seeded();
    assert!(source.execute("SELECT * FROM nonexistent").is_err());
}

#[test]
fn test_execute_syntax_error_fails() {
    let (_dir, source) = seeded();
    assert!(source.execute("SELEC nonsense").is_err());
}

#[test]
fn test_multiple_statements_are_refused() {
    let (_dir, source) = seeded();
    assert!(source.execute("SELECT 1; SELECT 2").is_err());
    assert!(source.execute("SELECT 1; DELETE FROM items").is_err());
    let result = source.execute("SELECT COUNT(*) FROM items;").unwrap();
    assert_eq!(result.rows[0], vec![Scalar::Integer(3)]);
}

#[test]
fn test_semicolon_inside_literal_executes() {
    let (_dir, source) = seeded();
    let result = source.execute("SELECT 'a; b' AS note").unwrap();
    assert_eq!(result.rows, vec![vec![Scalar::Text("a; b".into())]]);
}

#[test]
fn test_connection_released_after_failure() {
    let (_dir, source) = seeded();
    assert!(source.execute("SELECT * FROM nonexistent").is_err());
    let result = source.execute("SELECT COUNT(*) FROM items").unwrap();
    assert_eq!(result.rows[0], vec![Scalar::Integer(3)]);
}

#[test]
fn test_list_tables_and_columns() {
    let (_dir, source) = seeded();
    assert_eq!(source.list_tables().unwrap(), vec!["items"]);
    assert_eq!(
        source.list_columns("items").unwrap(),
        vec!["item_name", "qty", "price", "photo"]
    );
    assert!(source.list_columns("missing").unwrap().is_empty());
}

#[test]
fn test_missing_database_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = SqliteDataSource::new(dir.path().join("absent.db"));
    assert!(source.list_tables().is_err());
    assert!(!dir.path().join("absent.db").exists());
}
