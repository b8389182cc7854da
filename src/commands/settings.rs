// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Config};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), cfg)? {
                let rows = vec![
                    vec!["db_path".into(), cfg.db_path.display().to_string()],
                    vec!["currency".into(), cfg.currency.clone()],
                    vec!["recent_limit".into(), cfg.recent_limit.to_string()],
                ];
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            config::set(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
