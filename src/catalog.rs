// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Built-in category catalogs. Transactions reference categories by id only;
//! an id with no catalog entry renders as [`UNKNOWN_NAME`].

use once_cell::sync::Lazy;

use crate::models::{Category, TransactionType};

pub const EXPENSE_CATEGORIES: &[Category] = &[
    Category {
        id: "food",
        name: "Food",
        kind: TransactionType::Expense,
        icon: "🍽️",
    },
    Category {
        id: "transport",
        name: "Transport",
        kind: TransactionType::Expense,
        icon: "🚗",
    },
    Category {
        id: "housing",
        name: "Housing",
        kind: TransactionType::Expense,
        icon: "🏠",
    },
    Category {
        id: "utilities",
        name: "Internet & Phone",
        kind: TransactionType::Expense,
        icon: "📱",
    },
    Category {
        id: "health",
        name: "Health",
        kind: TransactionType::Expense,
        icon: "⚕️",
    },
    Category {
        id: "entertainment",
        name: "Entertainment",
        kind: TransactionType::Expense,
        icon: "🎬",
    },
    Category {
        id: "other-expense",
        name: "Other",
        kind: TransactionType::Expense,
        icon: "📦",
    },
];

pub const INCOME_CATEGORIES: &[Category] = &[
    Category {
        id: "salary",
        name: "Salary",
        kind: TransactionType::Income,
        icon: "💼",
    },
    Category {
        id: "freelance",
        name: "Freelance",
        kind: TransactionType::Income,
        icon: "💻",
    },
    Category {
        id: "sale",
        name: "Sale",
        kind: TransactionType::Income,
        icon: "💰",
    },
    Category {
        id: "other-income",
        name: "Other",
        kind: TransactionType::Income,
        icon: "🎁",
    },
];

/// Placeholder for category ids missing from both catalogs.
pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_ICON: &str = "❓";

static ALL: Lazy<Vec<Category>> = Lazy::new(|| {
    EXPENSE_CATEGORIES
        .iter()
        .chain(INCOME_CATEGORIES.iter())
        .copied()
        .collect()
});

pub fn all() -> &'static [Category] {
    &ALL
}

pub fn for_type(kind: TransactionType) -> &'static [Category] {
    match kind {
        TransactionType::Expense => EXPENSE_CATEGORIES,
        TransactionType::Income => INCOME_CATEGORIES,
    }
}

pub fn find(id: &str) -> Option<&'static Category> {
    ALL.iter().find(|c| c.id == id)
}

/// Display name and icon for a category id, falling back to the unknown placeholder.
pub fn describe(id: &str) -> (&'static str, &'static str) {
    match find(id) {
        Some(c) => (c.name, c.icon),
        None => (UNKNOWN_NAME, UNKNOWN_ICON),
    }
}
