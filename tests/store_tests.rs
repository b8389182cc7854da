// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{Connection, params};
use serde_json::json;
use tallybook::error::LedgerError;
use tallybook::ledger::LedgerStore;
use tallybook::models::{NewTransaction, TransactionType};
use tallybook::store::{self, Session};

fn seed(conn: &Connection, blob: &str) {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES (?1, ?2)",
        params![store::LEDGER_KEY, blob],
    )
    .unwrap();
}

fn blob(conn: &Connection) -> String {
    conn.query_row(
        "SELECT value FROM kv WHERE key=?1",
        params![store::LEDGER_KEY],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn empty_database_loads_empty_ledger() {
    let conn = store::open_in_memory().unwrap();
    let report = store::load_transactions(&conn).unwrap();
    assert!(report.transactions.is_empty());
    assert!(report.rejected.is_empty());
}

#[test]
fn malformed_records_are_excluded_not_fatal() {
    let conn = store::open_in_memory().unwrap();
    let records = json!([
        {"id": "1704067200000", "type": "income", "amount": 1000, "category": "salary", "date": "2024-01-01"},
        {"id": "2", "type": "expense", "amount": 300, "category": "food", "date": "yesterday-ish"},
        {"id": "3", "type": "expense", "amount": -20, "category": "food", "date": "2024-01-02"},
        {"id": "4", "amount": 5, "category": "food", "date": "2024-01-02"},
        {"id": "5", "type": "expense", "amount": "12,5", "category": "transport", "date": "2024-01-03 08:15:00"},
        {"id": "6", "type": "expense", "amount": 7, "category": "", "date": "2024-01-03"},
        "not an object",
        {"id": "8", "type": "expense", "amount": "abc", "category": "food", "date": "2024-01-03"},
        {"id": "5", "type": "income", "amount": 9, "category": "sale", "date": "2024-01-04"},
        {"id": "10", "type": "income", "amount": "79228162514264337593543950335", "category": "salary", "date": "2024-01-04"},
        {"id": "11", "type": "income", "amount": "79228162514264337593543950335", "category": "salary", "date": "2024-01-04"}
    ]);
    seed(&conn, &records.to_string());

    let report = store::load_transactions(&conn).unwrap();
    let ids: Vec<&str> = report.transactions.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1704067200000", "5"]);
    let rejected: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![1, 2, 3, 5, 6, 7, 8, 9, 10]);
    assert!(report.rejected[0].reason.contains("date"));
    assert_eq!(report.rejected[6].reason, "duplicate id 5");
    assert!(report.rejected[7].reason.contains("exceeds the maximum"));

    let first = &report.transactions[0];
    let midnight = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(first.date, midnight);
    assert_eq!(report.transactions[1].amount.to_string(), "12.5");
}

#[test]
fn duplicate_ids_keep_the_first_record_only() {
    let conn = store::open_in_memory().unwrap();
    let records = json!([
        {"id": "1", "type": "income", "amount": 5, "category": "sale", "date": "2024-01-01"},
        {"id": "1", "type": "expense", "amount": 7, "category": "food", "date": "2024-01-02"},
        {"id": "2", "type": "expense", "amount": 3, "category": "food", "date": "2024-01-02"}
    ]);
    seed(&conn, &records.to_string());

    let mut session = Session::load(&conn).unwrap();
    assert_eq!(session.ledger.len(), 2);
    assert_eq!(session.rejected.len(), 1);
    assert_eq!(session.ledger.get("1").unwrap().kind, TransactionType::Income);
    assert!(session.pending_drop_notice().is_some());

    assert!(session.ledger.remove("1"));
    assert_eq!(session.ledger.len(), 1);
    session.save(&conn).unwrap();
    let reloaded = store::load_transactions(&conn).unwrap();
    assert!(reloaded.rejected.is_empty());
    assert_eq!(reloaded.transactions.len(), 1);
}

#[test]
fn oversized_persisted_amounts_do_not_break_loading() {
    let conn = store::open_in_memory().unwrap();
    let max = "79228162514264337593543950335";
    let records = json!([
        {"id": "1", "type": "income", "amount": max, "category": "salary", "date": "2024-01-01"},
        {"id": "2", "type": "income", "amount": max, "category": "salary", "date": "2024-01-02"},
        {"id": "3", "type": "income", "amount": "1000000000000000", "category": "salary", "date": "2024-01-03"}
    ]);
    seed(&conn, &records.to_string());

    let session = Session::load(&conn).unwrap();
    assert_eq!(session.ledger.len(), 1);
    assert_eq!(session.rejected.len(), 2);
    assert_eq!(
        session.ledger.financial_summary().total_income.to_string(),
        "1000000000000000"
    );
}

#[test]
fn serialized_dates_are_normalized_to_local_time() {
    let iso = "2024-01-02T10:00:00.000Z";
    let expected = DateTime::parse_from_rfc3339(iso)
        .unwrap()
        .with_timezone(&Local)
        .naive_local();
    assert_eq!(store::normalize_date(&json!(iso)), Some(expected));

    let millis = 1_704_189_600_000i64;
    let expected = DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap()
        .with_timezone(&Local)
        .naive_local();
    assert_eq!(store::normalize_date(&json!(millis)), Some(expected));

    assert!(store::normalize_date(&json!(null)).is_none());
    assert!(store::normalize_date(&json!("02/01/2024")).is_none());
}

#[test]
fn blob_that_is_not_a_list_is_a_load_failure() {
    let conn = store::open_in_memory().unwrap();
    seed(&conn, r#"{"transactions": []}"#);
    let err = store::load_transactions(&conn).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::MalformedBlob(_))
    ));
}

#[test]
fn loading_does_not_rewrite_storage() {
    let conn = store::open_in_memory().unwrap();
    let original = r#"[{"id":"a","type":"income","amount":5,"category":"sale","date":"2024-01-01"}]"#;
    seed(&conn, original);
    let session = Session::load(&conn).unwrap();
    assert_eq!(session.ledger.len(), 1);
    assert_eq!(session.save(&conn).unwrap(), 0);
    assert_eq!(blob(&conn), original);
}

#[test]
fn flush_persists_latest_snapshot() {
    let conn = store::open_in_memory().unwrap();
    let mut ledger = LedgerStore::new();
    let events = ledger.subscribe();
    let date = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let income = NewTransaction::new(
        TransactionType::Income,
        "900".parse().unwrap(),
        "freelance",
        date,
    );
    ledger.add(income).unwrap();
    let bill = NewTransaction::new(
        TransactionType::Expense,
        "35.20".parse().unwrap(),
        "utilities",
        date,
    );
    let id = ledger
        .add(bill.with_note("fiber"))
        .unwrap()
        .id
        .clone();

    assert_eq!(store::flush(&conn, &events).unwrap(), 2);
    assert_eq!(store::flush(&conn, &events).unwrap(), 0);

    let report = store::load_transactions(&conn).unwrap();
    assert_eq!(report.transactions, ledger.transactions());
    assert_eq!(report.transactions[0].id, id);
    assert_eq!(report.transactions[0].note.as_deref(), Some("fiber"));
}

#[test]
fn settings_upsert() {
    let conn = store::open_in_memory().unwrap();
    assert_eq!(store::get_setting(&conn, "currency").unwrap(), None);
    store::set_setting(&conn, "currency", "EUR").unwrap();
    store::set_setting(&conn, "currency", "DZD").unwrap();
    assert_eq!(store::get_setting(&conn, "currency").unwrap().as_deref(), Some("DZD"));
}

#[test]
fn open_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ledger.sqlite");
    {
        let conn = store::open(&path).unwrap();
        store::save_transactions(&conn, &[]).unwrap();
    }
    assert!(path.exists());
    let conn = store::open(&path).unwrap();
    assert_eq!(blob(&conn), "[]");
}
