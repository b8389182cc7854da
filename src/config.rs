// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

use crate::store::{self, get_setting, set_setting};

pub const DB_ENV: &str = "TALLYBOOK_DB";
pub const DEFAULT_CURRENCY: &str = "DZD";
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Keys accepted by `config set`.
pub const SETTING_KEYS: &[&str] = &["currency", "recent_limit"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub db_path: PathBuf,
    pub currency: String,
    pub recent_limit: usize,
}

/// Database location: `TALLYBOOK_DB` if set, else the platform data dir.
pub fn db_path() -> Result<PathBuf> {
    match std::env::var_os(DB_ENV) {
        Some(p) if !p.is_empty() => Ok(PathBuf::from(p)),
        _ => store::default_db_path(),
    }
}

impl Config {
    /// Resolve preferences stored in the settings table, falling back to defaults.
    pub fn resolve(conn: &Connection, db_path: PathBuf) -> Result<Self> {
        let currency = get_setting(conn, "currency")?
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let recent_limit = match get_setting(conn, "recent_limit")? {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("Invalid recent_limit setting '{}'", v))?,
            None => DEFAULT_RECENT_LIMIT,
        };
        Ok(Self {
            db_path,
            currency,
            recent_limit,
        })
    }
}

pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    match key {
        "currency" => {
            let v = value.trim().to_uppercase();
            if v.is_empty() {
                return Err(anyhow!("currency label cannot be empty"));
            }
            set_setting(conn, key, &v)
        }
        "recent_limit" => {
            let n = value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid recent_limit '{}'", value))?;
            set_setting(conn, key, &n.to_string())
        }
        other => Err(anyhow!(
            "Unknown setting '{}' (expected one of: {})",
            other,
            SETTING_KEYS.join(", ")
        )),
    }
}
