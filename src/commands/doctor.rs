// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use crate::catalog;
use crate::store::Session;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let session = Session::load(conn)?;
    let mut rows = Vec::new();

    // 1) Records dropped on load
    for r in &session.rejected {
        rows.push(vec![
            "malformed_record".into(),
            format!("#{}: {}", r.index, r.reason),
        ]);
    }

    // 2) Category ids with no catalog entry, or from the other catalog
    let mut unknown: BTreeMap<&str, usize> = BTreeMap::new();
    let mut mismatched: BTreeMap<&str, usize> = BTreeMap::new();
    for t in session.ledger.transactions() {
        match catalog::find(&t.category) {
            None => *unknown.entry(t.category.as_str()).or_default() += 1,
            Some(c) if c.kind != t.kind => {
                *mismatched.entry(t.category.as_str()).or_default() += 1
            }
            Some(_) => {}
        }
    }
    for (cat, n) in unknown {
        rows.push(vec!["unknown_category".into(), format!("{} ({} txns)", cat, n)]);
    }
    for (cat, n) in mismatched {
        rows.push(vec!["category_type_mismatch".into(), format!("{} ({} txns)", cat, n)]);
    }

    // 3) Loss on the next write
    if let Some(notice) = session.pending_drop_notice() {
        rows.push(vec!["pending_drop".into(), notice]);
    }
    Ok(rows)
}
