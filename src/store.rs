// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Durable storage for the ledger: a key-value table in SQLite holding the
//! serialized transaction list, plus a settings table.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::ledger::{LedgerEvent, LedgerStore, validate_amount};
use crate::models::{Transaction, TransactionType};
use crate::utils::parse_amount;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.tallybook", "Tallybook", "tallybook"));

pub const LEDGER_KEY: &str = "budget_transactions";

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tallybook.sqlite"))
}

pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Create data dir {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS kv(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn get_blob(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| r.get(0))
        .optional()?;
    Ok(v)
}

fn put_blob(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

/// A persisted record that could not be turned into a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: String,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parse a serialized ledger. Records are checked one by one; malformed ones are
/// reported in `rejected` and left out, as is any record repeating an earlier
/// id. Only a blob that is not a JSON array fails the whole load.
pub fn parse_ledger(json: &str) -> std::result::Result<LoadReport, LedgerError> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    let mut report = LoadReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    for (index, value) in values.iter().enumerate() {
        let parsed = parse_record(value).and_then(|tx| {
            if seen.insert(tx.id.clone()) {
                Ok(tx)
            } else {
                Err(format!("duplicate id {}", tx.id))
            }
        });
        match parsed {
            Ok(tx) => report.transactions.push(tx),
            Err(reason) => {
                warn!(index, %reason, "skipping malformed ledger record");
                report.rejected.push(RejectedRecord {
                    index,
                    reason,
                    raw: value.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn parse_record(value: &Value) -> std::result::Result<Transaction, String> {
    let obj = value.as_object().ok_or("record is not an object")?;

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("missing id".into()),
    };
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .parse::<TransactionType>()
        .map_err(|e| e.to_string())?;
    let amount = match obj.get("amount") {
        Some(Value::Number(n)) => parse_amount(&n.to_string()),
        Some(Value::String(s)) => parse_amount(s),
        _ => Err(LedgerError::InvalidAmount(String::new())),
    }
    .map_err(|e| e.to_string())?;
    validate_amount(amount).map_err(|e| e.to_string())?;
    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LedgerError::MissingCategory.to_string())?
        .to_string();
    let date = obj
        .get("date")
        .and_then(normalize_date)
        .ok_or_else(|| format!("unparseable date {}", obj.get("date").unwrap_or(&Value::Null)))?;
    let note = obj
        .get("note")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|n| !n.is_empty());

    Ok(Transaction {
        id,
        kind,
        amount,
        category,
        date,
        note,
    })
}

/// Turn a serialized date-like value into a local calendar timestamp.
///
/// Accepts RFC 3339 strings (converted to local time), naive ISO timestamps,
/// bare `YYYY-MM-DD` dates (midnight) and integer epoch milliseconds.
pub fn normalize_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Local).naive_local());
            }
            for fmt in [
                "%Y-%m-%dT%H:%M:%S",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M",
            ] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.with_timezone(&Local).naive_local()),
        _ => None,
    }
}

pub fn load_transactions(conn: &Connection) -> Result<LoadReport> {
    match get_blob(conn, LEDGER_KEY)? {
        None => Ok(LoadReport::default()),
        Some(json) => {
            let report = parse_ledger(&json).context("Failed to load ledger")?;
            debug!(
                loaded = report.transactions.len(),
                rejected = report.rejected.len(),
                "ledger loaded"
            );
            Ok(report)
        }
    }
}

pub fn save_transactions(conn: &Connection, transactions: &[Transaction]) -> Result<()> {
    let json = serde_json::to_string(transactions)?;
    put_blob(conn, LEDGER_KEY, &json)?;
    debug!(count = transactions.len(), "ledger saved");
    Ok(())
}

/// Drain pending ledger events and persist the most recent snapshot.
/// Returns how many events were drained.
pub fn flush(conn: &Connection, events: &Receiver<LedgerEvent>) -> Result<usize> {
    let mut drained = 0;
    let mut latest = None;
    for event in events.try_iter() {
        drained += 1;
        latest = Some(event);
    }
    if let Some(event) = latest {
        save_transactions(conn, &event.transactions)
            .with_context(|| format!("Persist ledger after {:?}", event.change))?;
    }
    Ok(drained)
}

/// A ledger loaded from the database, with its change feed wired back to it.
pub struct Session<C: Clock = SystemClock> {
    pub ledger: LedgerStore<C>,
    pub rejected: Vec<RejectedRecord>,
    events: Receiver<LedgerEvent>,
}

impl Session<SystemClock> {
    pub fn load(conn: &Connection) -> Result<Self> {
        Self::load_with_clock(conn, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn load_with_clock(conn: &Connection, clock: C) -> Result<Self> {
        let report = load_transactions(conn)?;
        let mut ledger = LedgerStore::with_clock(clock);
        ledger.initialize(report.transactions);
        // Subscribe after the initial load so an unchanged ledger is not rewritten.
        let events = ledger.subscribe();
        Ok(Self {
            ledger,
            rejected: report.rejected,
            events,
        })
    }

    /// Persist any mutations made since the last save. Records rejected on
    /// load are not part of the snapshot and leave storage here.
    pub fn save(&self, conn: &Connection) -> Result<usize> {
        let drained = flush(conn, &self.events)?;
        if drained > 0 && !self.rejected.is_empty() {
            warn!(
                dropped = self.rejected.len(),
                "malformed records removed from storage"
            );
        }
        Ok(drained)
    }

    /// One-line notice for records that the next saved change will drop.
    pub fn pending_drop_notice(&self) -> Option<String> {
        match self.rejected.len() {
            0 => None,
            n => Some(format!(
                "{} malformed record(s) will be removed from storage by the next change",
                n
            )),
        }
    }
}
