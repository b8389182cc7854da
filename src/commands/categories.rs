// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::catalog;
use crate::utils::{parse_type, pretty_table};
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let cats = match sub.get_one::<String>("type") {
            Some(t) => catalog::for_type(parse_type(t)?).to_vec(),
            None => catalog::all().to_vec(),
        };
        let data = cats
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    format!("{} {}", c.icon, c.name),
                    c.kind.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Id", "Category", "Type"], data));
    }
    Ok(())
}
