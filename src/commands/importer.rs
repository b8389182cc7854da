// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::LedgerStore;
use crate::store::{LoadReport, flush, parse_ledger};
use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let report = import_transactions(conn, path)?;
            println!(
                "Imported {} transactions from {}",
                report.transactions.len(),
                path
            );
            if !report.rejected.is_empty() {
                let rows = report
                    .rejected
                    .iter()
                    .map(|r| vec![r.index.to_string(), r.reason.clone()])
                    .collect();
                println!("Skipped {} malformed records:", report.rejected.len());
                println!("{}", pretty_table(&["Index", "Reason"], rows));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Replace the ledger with the contents of a JSON export. Malformed records are
/// skipped and returned in the report.
pub fn import_transactions(conn: &Connection, path: &str) -> Result<LoadReport> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
    let report = parse_ledger(&json).with_context(|| format!("Parse {}", path))?;

    let mut ledger = LedgerStore::new();
    let events = ledger.subscribe();
    ledger.initialize(report.transactions.clone());
    flush(conn, &events)?;
    Ok(report)
}
