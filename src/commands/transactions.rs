// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::catalog;
use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::LedgerStore;
use crate::models::{NewTransaction, TransactionPatch};
use crate::store::Session;
use crate::summary::{TransactionFilter, filter_transactions};
use crate::utils::{
    fmt_money, fmt_signed, maybe_print_json, parse_amount, parse_date, parse_type, parse_window,
    pretty_table,
};
use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

pub fn handle(conn: &Connection, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, cfg, sub)?,
        Some(("list", sub)) => list(conn, cfg, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Build the input for `LedgerStore::add` from `tx add` arguments. A missing
/// date means `now`.
pub fn new_from_args(sub: &clap::ArgMatches, now: NaiveDateTime) -> Result<NewTransaction> {
    let kind = parse_type(sub.get_one::<String>("type").map(String::as_str).unwrap_or(""))?;
    let amount = parse_amount(sub.get_one::<String>("amount").map(String::as_str).unwrap_or(""))?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => now,
    };
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty());
    Ok(NewTransaction {
        kind,
        amount,
        category,
        date,
        note,
    })
}

pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TransactionPatch> {
    let mut patch = TransactionPatch::default();
    if let Some(t) = sub.get_one::<String>("type") {
        patch.kind = Some(parse_type(t)?);
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        patch.amount = Some(parse_amount(a)?);
    }
    if let Some(c) = sub.get_one::<String>("category") {
        patch.category = Some(c.to_string());
    }
    if let Some(d) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(d)?);
    }
    if let Some(n) = sub.get_one::<String>("note") {
        patch.note = Some(Some(n.to_string()));
    } else if sub.get_flag("clear-note") {
        patch.note = Some(None);
    }
    Ok(patch)
}

fn warn_pending_drop(session: &Session) {
    if let Some(notice) = session.pending_drop_notice() {
        warn!("{}", notice);
    }
}

fn add(conn: &Connection, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let mut session = Session::load(conn)?;
    let new = new_from_args(sub, session.ledger.now())?;
    match catalog::find(&new.category) {
        None => warn!(category = %new.category, "category not in catalog"),
        Some(c) if c.kind != new.kind => warn!(
            category = %new.category,
            kind = %new.kind,
            "category belongs to the other catalog"
        ),
        Some(_) => {}
    }
    let tx = session.ledger.add(new)?.clone();
    warn_pending_drop(&session);
    session.save(conn)?;
    let (name, icon) = catalog::describe(&tx.category);
    println!(
        "Recorded {} {} {} {} on {} (id: {})",
        tx.kind,
        fmt_money(&tx.amount, &cfg.currency),
        icon,
        name,
        tx.date.format("%Y-%m-%d"),
        tx.id
    );
    Ok(())
}

fn list(conn: &Connection, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let session = Session::load(conn)?;
    let data = query_rows(&session.ledger, cfg, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No transactions found");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    format!("{} {}", r.icon, r.category_name),
                    r.display_amount.clone(),
                    r.note.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Category", "Amount", "Note", "Id"], rows)
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let patch = patch_from_args(sub)?;
    if patch.is_empty() {
        bail!("Nothing to change for transaction {}", id);
    }
    let mut session = Session::load(conn)?;
    if session.ledger.update(id, patch)? {
        warn_pending_drop(&session);
        session.save(conn)?;
        println!("Updated transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let mut session = Session::load(conn)?;
    if session.ledger.remove(id) {
        warn_pending_drop(&session);
        session.save(conn)?;
        println!("Removed transaction {}", id);
    } else {
        println!("No transaction with id {}", id);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub category_name: String,
    #[serde(skip)]
    pub icon: String,
    pub amount: String,
    #[serde(skip)]
    pub display_amount: String,
    pub note: String,
}

pub fn query_rows<C: Clock>(
    ledger: &LedgerStore<C>,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let filter = TransactionFilter {
        kind: sub.get_one::<String>("type").map(|t| parse_type(t)).transpose()?,
        window: sub.get_one::<String>("period").map(|p| parse_window(p)).transpose()?,
        limit: Some(sub.get_one::<usize>("limit").copied().unwrap_or(cfg.recent_limit)),
    };
    let data = filter_transactions(ledger.transactions(), &filter, ledger.now())
        .into_iter()
        .map(|t| {
            let (name, icon) = catalog::describe(&t.category);
            TransactionRow {
                id: t.id.clone(),
                date: t.date.format("%Y-%m-%d %H:%M").to_string(),
                kind: t.kind.to_string(),
                category: t.category.clone(),
                category_name: name.to_string(),
                icon: icon.to_string(),
                amount: t.amount.to_string(),
                display_amount: fmt_signed(&t.amount, t.kind, &cfg.currency),
                note: t.note.clone().unwrap_or_default(),
            }
        })
        .collect();
    Ok(data)
}
