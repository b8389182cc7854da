// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("amount {0} exceeds the maximum of {max}", max = crate::ledger::MAX_AMOUNT)]
    AmountTooLarge(Decimal),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("category is required")]
    MissingCategory,
    #[error("transaction type is required")]
    MissingType,
    #[error("unknown transaction type '{0}', expected expense|income")]
    InvalidType(String),
    #[error("persisted ledger is not a list of transactions: {0}")]
    MalformedBlob(#[from] serde_json::Error),
}
