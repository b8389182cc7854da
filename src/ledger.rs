// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger store: sole owner of the transaction collection. Every effective
//! mutation recomputes all summaries before returning, then notifies subscribers
//! with a snapshot of the collection.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{LedgerError, Result};
use crate::models::{
    CategoryExpense, FinancialSummary, NewTransaction, Transaction, TransactionPatch,
    WindowSummary,
};
use crate::summary::Summaries;

/// Largest accepted magnitude for a single transaction (10^15). Keeps every
/// aggregate far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Initialized,
    Added(String),
    Updated(String),
    Removed(String),
}

/// Emitted after a mutation has been applied and summaries recomputed.
#[derive(Debug, Clone)]
pub struct LedgerEvent {
    pub change: Change,
    pub transactions: Vec<Transaction>,
}

pub struct LedgerStore<C: Clock = SystemClock> {
    transactions: Vec<Transaction>,
    summaries: Summaries,
    clock: C,
    subscribers: Vec<Sender<LedgerEvent>>,
}

impl LedgerStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for LedgerStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LedgerStore<C> {
    pub fn with_clock(clock: C) -> Self {
        let summaries = Summaries::compute(&[], clock.now());
        Self {
            transactions: Vec::new(),
            summaries,
            clock,
            subscribers: Vec::new(),
        }
    }

    /// Replace the whole collection, e.g. with records loaded at startup.
    pub fn initialize(&mut self, transactions: Vec<Transaction>) {
        info!(count = transactions.len(), "ledger initialized");
        self.transactions = transactions;
        self.commit(Change::Initialized);
    }

    /// Validate and insert a new transaction at the front of the ledger.
    pub fn add(&mut self, new: NewTransaction) -> Result<&Transaction> {
        validate_amount(new.amount)?;
        let category = validate_category(&new.category)?;
        let tx = Transaction {
            id: self.next_id(),
            kind: new.kind,
            amount: new.amount,
            category,
            date: new.date,
            note: normalize_note(new.note),
        };
        info!(id = %tx.id, kind = %tx.kind, amount = %tx.amount, "transaction added");
        let id = tx.id.clone();
        self.transactions.insert(0, tx);
        self.commit(Change::Added(id));
        Ok(&self.transactions[0])
    }

    /// Merge `patch` into the record with `id`. Returns `Ok(false)` when no such
    /// record exists; the ledger is untouched in that case.
    pub fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<bool> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        let category = match &patch.category {
            Some(c) => Some(validate_category(c)?),
            None => None,
        };
        let Some(existing) = self.transactions.iter_mut().find(|t| t.id == id) else {
            debug!(id, "update ignored, no such transaction");
            return Ok(false);
        };
        if let Some(kind) = patch.kind {
            existing.kind = kind;
        }
        if let Some(amount) = patch.amount {
            existing.amount = amount;
        }
        if let Some(category) = category {
            existing.category = category;
        }
        if let Some(date) = patch.date {
            existing.date = date;
        }
        if let Some(note) = patch.note {
            existing.note = normalize_note(note);
        }
        info!(id, "transaction updated");
        self.commit(Change::Updated(id.to_string()));
        Ok(true)
    }

    /// Delete the record with `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            debug!(id, "remove ignored, no such transaction");
            return false;
        }
        info!(id, "transaction removed");
        self.commit(Change::Removed(id.to_string()));
        true
    }

    /// Recompute summaries against the current clock without touching the
    /// collection.
    pub fn refresh(&mut self) {
        self.summaries = Summaries::compute(&self.transactions, self.clock.now());
    }

    pub fn subscribe(&mut self) -> Receiver<LedgerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn summaries(&self) -> &Summaries {
        &self.summaries
    }

    pub fn financial_summary(&self) -> &FinancialSummary {
        &self.summaries.financial
    }

    pub fn daily_summary(&self) -> &WindowSummary {
        &self.summaries.daily
    }

    pub fn weekly_summary(&self) -> &WindowSummary {
        &self.summaries.weekly
    }

    pub fn monthly_summary(&self) -> &WindowSummary {
        &self.summaries.monthly
    }

    pub fn category_expenses(&self) -> &[CategoryExpense] {
        &self.summaries.category_expenses
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn next_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, change: Change) {
        self.refresh();
        debug!(
            count = self.transactions.len(),
            balance = %self.summaries.financial.balance,
            "summaries recomputed"
        );
        if self.subscribers.is_empty() {
            return;
        }
        let event = LedgerEvent {
            change,
            transactions: self.transactions.clone(),
        };
        self.subscribers.retain(|s| s.send(event.clone()).is_ok());
    }
}

pub(crate) fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::AmountTooLarge(amount));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<String> {
    let c = category.trim();
    if c.is_empty() {
        return Err(LedgerError::MissingCategory);
    }
    Ok(c.to_string())
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
