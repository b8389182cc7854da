// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived views over the ledger. Everything here is a pure function of the
//! transaction slice and the reference instant `now`.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    CategoryExpense, DailyPoint, FinancialStatus, FinancialSummary, Transaction, TransactionType,
    WindowSummary,
};

/// Rolling summary windows. Each window is rooted at a start instant computed
/// from `now`; week and month windows have no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Day,
    Week,
    Month,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Day, Window::Week, Window::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Day => "day",
            Window::Week => "week",
            Window::Month => "month",
        }
    }

    /// Midnight starting the window that contains `now`. Weeks start on Monday.
    pub fn start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        let first = match self {
            Window::Day => today,
            Window::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            Window::Month => today - Duration::days(i64::from(today.day0())),
        };
        first.and_time(NaiveTime::MIN)
    }

    pub fn contains(&self, date: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Window::Day => date.date() == now.date(),
            Window::Week | Window::Month => date >= self.start(now),
        }
    }
}

/// Every derived view, recomputed as a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summaries {
    pub financial: FinancialSummary,
    pub daily: WindowSummary,
    pub weekly: WindowSummary,
    pub monthly: WindowSummary,
    pub category_expenses: Vec<CategoryExpense>,
}

impl Summaries {
    pub fn compute(transactions: &[Transaction], now: NaiveDateTime) -> Self {
        Self {
            financial: financial_summary(transactions),
            daily: window_summary(transactions, Window::Day, now),
            weekly: window_summary(transactions, Window::Week, now),
            monthly: window_summary(transactions, Window::Month, now),
            category_expenses: category_expenses(transactions),
        }
    }

    pub fn window(&self, window: Window) -> &WindowSummary {
        match window {
            Window::Day => &self.daily,
            Window::Week => &self.weekly,
            Window::Month => &self.monthly,
        }
    }

    pub fn status(&self) -> FinancialStatus {
        FinancialStatus::from_balance(self.financial.balance)
    }
}

fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> WindowSummary {
    let mut out = WindowSummary::default();
    for t in transactions {
        match t.kind {
            TransactionType::Income => out.income += t.amount,
            TransactionType::Expense => out.expenses += t.amount,
        }
    }
    out
}

pub fn financial_summary(transactions: &[Transaction]) -> FinancialSummary {
    let WindowSummary { income, expenses } = totals(transactions);
    let balance = income - expenses;
    FinancialSummary {
        total_income: income,
        total_expenses: expenses,
        balance,
        difference: balance,
    }
}

pub fn window_summary(
    transactions: &[Transaction],
    window: Window,
    now: NaiveDateTime,
) -> WindowSummary {
    totals(transactions.iter().filter(|t| window.contains(t.date, now)))
}

/// Expense totals per category across the whole ledger, in order of first
/// appearance. Categories without expenses are absent, not zero.
pub fn category_expenses(transactions: &[Transaction]) -> Vec<CategoryExpense> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryExpense> = Vec::new();
    for t in transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
    {
        match index.get(t.category.as_str()) {
            Some(&i) => out[i].amount += t.amount,
            None => {
                index.insert(t.category.as_str(), out.len());
                out.push(CategoryExpense {
                    category: t.category.clone(),
                    amount: t.amount,
                });
            }
        }
    }
    out
}

/// Per-day income/expense totals for the `days` calendar days ending today,
/// oldest first.
pub fn daily_series(
    transactions: &[Transaction],
    now: NaiveDateTime,
    days: u32,
) -> Vec<DailyPoint> {
    let today = now.date();
    let first = today - Duration::days(i64::from(days.saturating_sub(1)));
    let mut buckets: BTreeMap<NaiveDate, WindowSummary> = BTreeMap::new();
    for t in transactions {
        let d = t.date.date();
        if d >= first && d <= today {
            let entry = buckets.entry(d).or_default();
            match t.kind {
                TransactionType::Income => entry.income += t.amount,
                TransactionType::Expense => entry.expenses += t.amount,
            }
        }
    }
    (0..days)
        .map(|offset| {
            let date = first + Duration::days(i64::from(offset));
            let w = buckets.get(&date).copied().unwrap_or_default();
            DailyPoint {
                date,
                income: w.income,
                expenses: w.expenses,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub window: Option<Window>,
    pub limit: Option<usize>,
}

/// Ledger rows matching the filter, in ledger order (newest first).
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
    now: NaiveDateTime,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| filter.kind.is_none_or(|k| t.kind == k))
        .filter(|t| filter.window.is_none_or(|w| w.contains(t.date, now)))
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect()
}

/// Sum of all expense amounts; equals `FinancialSummary::total_expenses`.
pub fn category_total(entries: &[CategoryExpense]) -> Decimal {
    entries.iter().map(|e| e.amount).sum()
}
