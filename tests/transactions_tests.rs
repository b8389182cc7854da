// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, params};
use tallybook::clock::FixedClock;
use tallybook::commands::transactions;
use tallybook::config::Config;
use tallybook::error::LedgerError;
use tallybook::store::{self, Session};
use tallybook::cli;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn cfg() -> Config {
    Config {
        db_path: PathBuf::from(":memory:"),
        currency: "DZD".into(),
        recent_limit: 10,
    }
}

fn setup() -> Connection {
    let conn = store::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv(key, value) VALUES (?1, ?2)",
        params![
            store::LEDGER_KEY,
            r#"[
                {"id":"3","type":"expense","amount":"10","category":"food","date":"2025-01-03T09:00:00"},
                {"id":"2","type":"income","amount":"250","category":"salary","date":"2025-01-02T09:00:00"},
                {"id":"1","type":"expense","amount":"4.5","category":"transport","date":"2025-01-01T09:00:00"}
            ]"#
        ],
    )
    .unwrap();
    conn
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["tallybook", "tx"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let (_, sub) = tx_m.subcommand().expect("no tx action");
    sub.clone()
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let session = Session::load_with_clock(&conn, FixedClock::new(at(2025, 1, 3))).unwrap();
    let list_m = sub_matches(&["list", "--limit", "2"]);
    let rows = transactions::query_rows(&session.ledger, &cfg(), &list_m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "3");
    assert_eq!(rows[0].date, "2025-01-03 09:00");
    assert_eq!(rows[0].category_name, "Food");
}

#[test]
fn list_filters_by_type_and_period() {
    let conn = setup();
    // 2025-01-03 is a Friday; the week started Monday 2024-12-30.
    let session = Session::load_with_clock(&conn, FixedClock::new(at(2025, 1, 3))).unwrap();

    let list_m = sub_matches(&["list", "--type", "expense"]);
    let rows = transactions::query_rows(&session.ledger, &cfg(), &list_m).unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1"]);

    let list_m = sub_matches(&["list", "--period", "day"]);
    let rows = transactions::query_rows(&session.ledger, &cfg(), &list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_amount, "-10.00 DZD");

    let list_m = sub_matches(&["list", "--period", "fortnight"]);
    assert!(transactions::query_rows(&session.ledger, &cfg(), &list_m).is_err());
}

#[test]
fn add_persists_newest_first() {
    let conn = setup();
    let mut session = Session::load_with_clock(&conn, FixedClock::new(at(2025, 1, 4))).unwrap();
    let add_m = sub_matches(&[
        "add",
        "--type",
        "expense",
        "--amount",
        "12,75",
        "--category",
        "health",
        "--note",
        "pharmacy",
    ]);
    let new = transactions::new_from_args(&add_m, session.ledger.now()).unwrap();
    assert_eq!(new.date, at(2025, 1, 4));
    let id = session.ledger.add(new).unwrap().id.clone();
    assert_eq!(session.save(&conn).unwrap(), 1);

    let reloaded = Session::load(&conn).unwrap();
    let first = &reloaded.ledger.transactions()[0];
    assert_eq!(first.id, id);
    assert_eq!(first.amount.to_string(), "12.75");
    assert_eq!(first.note.as_deref(), Some("pharmacy"));
    assert_eq!(reloaded.ledger.len(), 4);
}

#[test]
fn add_rejects_negative_amount() {
    let conn = setup();
    let mut session = Session::load_with_clock(&conn, FixedClock::new(at(2025, 1, 4))).unwrap();
    let add_m = sub_matches(&[
        "add", "--type", "expense", "--amount=-5", "--category", "food", "--date", "2025-01-04",
    ]);
    let new = transactions::new_from_args(&add_m, session.ledger.now()).unwrap();
    let err = session.ledger.add(new).unwrap_err();
    assert!(matches!(err, LedgerError::NonPositiveAmount(_)));
    assert_eq!(session.ledger.len(), 3);
    assert_eq!(session.save(&conn).unwrap(), 0);
}

#[test]
fn add_requires_type_and_numeric_amount() {
    let now = at(2025, 1, 4);
    let add_m = sub_matches(&["add", "--type", "", "--amount", "5", "--category", "food"]);
    let err = transactions::new_from_args(&add_m, now).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::MissingType)
    ));

    let add_m = sub_matches(&["add", "--type", "income", "--amount", "lots", "--category", "sale"]);
    let err = transactions::new_from_args(&add_m, now).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidAmount(_))
    ));
}

#[test]
fn edit_patch_from_args() {
    let edit_m = sub_matches(&["edit", "2", "--amount", "300", "--clear-note"]);
    let patch = transactions::patch_from_args(&edit_m).unwrap();
    assert_eq!(patch.amount.unwrap().to_string(), "300");
    assert_eq!(patch.note, Some(None));
    assert!(patch.kind.is_none());

    let conn = setup();
    let mut session = Session::load_with_clock(&conn, FixedClock::new(at(2025, 1, 4))).unwrap();
    assert!(session.ledger.update("2", patch).unwrap());
    assert_eq!(session.ledger.financial_summary().total_income.to_string(), "300");
    assert_eq!(session.ledger.transactions()[1].id, "2");
}

#[test]
fn edit_unknown_id_leaves_ledger_alone() {
    let conn = setup();
    let mut session = Session::load_with_clock(&conn, FixedClock::new(at(2025, 1, 4))).unwrap();
    let before = session.ledger.transactions().to_vec();
    let summaries = session.ledger.summaries().clone();
    let edit_m = sub_matches(&["edit", "nope", "--amount", "50"]);
    let patch = transactions::patch_from_args(&edit_m).unwrap();
    assert!(!session.ledger.update("nope", patch).unwrap());
    assert_eq!(session.ledger.transactions(), before.as_slice());
    assert_eq!(session.ledger.summaries(), &summaries);
    assert_eq!(session.save(&conn).unwrap(), 0);
}
