// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::catalog;
use crate::config::Config;
use crate::models::{DailyPoint, FinancialStatus, FinancialSummary};
use crate::store::Session;
use crate::summary::{Window, daily_series};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let session = Session::load(conn)?;
    match m.subcommand() {
        Some(("summary", sub)) => summary(&session, cfg, sub)?,
        Some(("windows", sub)) => windows(&session, cfg, sub)?,
        Some(("categories", sub)) => categories(&session, cfg, sub)?,
        Some(("daily", sub)) => daily(&session, cfg, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct SummaryReport {
    #[serde(flatten)]
    pub financial: FinancialSummary,
    pub status: FinancialStatus,
}

fn summary(session: &Session, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let report = SummaryReport {
        financial: session.ledger.financial_summary().clone(),
        status: session.ledger.summaries().status(),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        let f = &report.financial;
        let rows = vec![
            vec!["Income".into(), fmt_money(&f.total_income, &cfg.currency)],
            vec!["Expenses".into(), fmt_money(&f.total_expenses, &cfg.currency)],
            vec!["Balance".into(), fmt_money(&f.balance, &cfg.currency)],
            vec!["Status".into(), report.status.label().to_string()],
        ];
        println!("{}", pretty_table(&["", "Total"], rows));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct WindowRow {
    pub period: Window,
    pub since: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

pub fn window_rows(session: &Session) -> Vec<WindowRow> {
    let now = session.ledger.now();
    Window::ALL
        .iter()
        .map(|w| {
            let s = session.ledger.summaries().window(*w);
            WindowRow {
                period: *w,
                since: w.start(now).format("%Y-%m-%d").to_string(),
                income: s.income,
                expenses: s.expenses,
                net: s.net(),
            }
        })
        .collect()
}

fn windows(session: &Session, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let data = window_rows(session);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.period.as_str().to_string(),
                    r.since.clone(),
                    fmt_money(&r.income, &cfg.currency),
                    fmt_money(&r.expenses, &cfg.currency),
                    fmt_money(&r.net, &cfg.currency),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Period", "Since", "Income", "Expenses", "Net"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub name: String,
    pub amount: Decimal,
    pub share: Decimal,
}

fn categories(session: &Session, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let total = session.ledger.financial_summary().total_expenses;
    let mut data: Vec<CategoryRow> = session
        .ledger
        .category_expenses()
        .iter()
        .map(|e| CategoryRow {
            category: e.category.clone(),
            name: catalog::describe(&e.category).0.to_string(),
            amount: e.amount,
            share: if total.is_zero() {
                Decimal::ZERO
            } else {
                e.amount * Decimal::ONE_HUNDRED / total
            },
        })
        .collect();
    data.sort_by(|a, b| b.amount.cmp(&a.amount));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No expenses recorded");
            return Ok(());
        }
        let rows = data
            .iter()
            .map(|r| {
                let (_, icon) = catalog::describe(&r.category);
                vec![
                    format!("{} {}", icon, r.name),
                    fmt_money(&r.amount, &cfg.currency),
                    format!("{:.0}%", r.share),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    }
    Ok(())
}

fn daily(session: &Session, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let days = *sub.get_one::<u32>("days").unwrap_or(&7);
    let data: Vec<DailyPoint> =
        daily_series(session.ledger.transactions(), session.ledger.now(), days);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.date.format("%a %Y-%m-%d").to_string(),
                    fmt_money(&p.income, &cfg.currency),
                    fmt_money(&p.expenses, &cfg.currency),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Day", "Income", "Expenses"], rows));
    }
    Ok(())
}
