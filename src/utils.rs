// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::models::TransactionType;
use crate::summary::Window;

/// Accepts `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM[:SS]`.
pub fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD [HH:MM]", s))
}

/// Parse a user-entered amount. Either `.` or `,` may be the decimal separator.
pub fn parse_amount(s: &str) -> std::result::Result<Decimal, LedgerError> {
    let cleaned = s.trim().replace(',', ".");
    if cleaned.is_empty() {
        return Err(LedgerError::InvalidAmount(s.to_string()));
    }
    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| LedgerError::InvalidAmount(s.to_string()))
}

pub fn parse_type(s: &str) -> std::result::Result<TransactionType, LedgerError> {
    s.parse()
}

pub fn parse_window(s: &str) -> Result<Window> {
    match s.trim().to_lowercase().as_str() {
        "day" | "today" => Ok(Window::Day),
        "week" => Ok(Window::Week),
        "month" => Ok(Window::Month),
        other => Err(anyhow!("Invalid period '{}', expected day|week|month", other)),
    }
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d, ccy)
}

pub fn fmt_signed(d: &Decimal, kind: TransactionType, ccy: &str) -> String {
    let sign = match kind {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    format!("{}{}", sign, fmt_money(d, ccy))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line.
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
