// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err(LedgerError::MissingType),
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(LedgerError::InvalidType(other.to_string())),
        }
    }
}

/// A single ledger record. `amount` is always a positive magnitude; the sign
/// is carried by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Input to `LedgerStore::add`; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDateTime,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            date,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Partial field merge for `LedgerStore::update`. `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub note: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.note.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub difference: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowSummary {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl WindowSummary {
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpense {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    Good,
    Balanced,
    NeedsAttention,
}

impl FinancialStatus {
    pub fn from_balance(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            FinancialStatus::Good
        } else if balance.is_zero() {
            FinancialStatus::Balanced
        } else {
            FinancialStatus::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FinancialStatus::Good => "Good",
            FinancialStatus::Balanced => "Balanced",
            FinancialStatus::NeedsAttention => "Needs attention",
        }
    }
}
