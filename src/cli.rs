// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn type_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .short('t')
        .required(required)
        .help("expense|income")
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .about("Personal income/expense ledger with rolling summaries")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("tx")
                .about("Record and manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(type_arg(true))
                        .arg(Arg::new("amount").long("amount").short('a').required(true))
                        .arg(Arg::new("category").long("category").short('c').required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .short('d')
                                .help("YYYY-MM-DD [HH:MM], defaults to now"),
                        )
                        .arg(Arg::new("note").long("note").short('n')),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List recent transactions, newest first")
                        .arg(type_arg(false))
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .short('p')
                                .help("day|week|month"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of an existing transaction")
                        .arg(Arg::new("id").required(true))
                        .arg(type_arg(false))
                        .arg(Arg::new("amount").long("amount").short('a'))
                        .arg(Arg::new("category").long("category").short('c'))
                        .arg(Arg::new("date").long("date").short('d'))
                        .arg(Arg::new("note").long("note").short('n'))
                        .arg(
                            Arg::new("clear-note")
                                .long("clear-note")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("note"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Derived summaries")
                .subcommand(json_flags(
                    Command::new("summary").about("Totals, balance and status"),
                ))
                .subcommand(json_flags(
                    Command::new("windows").about("Today, this week and this month"),
                ))
                .subcommand(json_flags(
                    Command::new("categories").about("Expenses per category"),
                ))
                .subcommand(json_flags(
                    Command::new("daily").about("Per-day totals").arg(
                        Arg::new("days")
                            .long("days")
                            .value_parser(value_parser!(u32).range(1..=366))
                            .default_value("7"),
                    ),
                )),
        )
        .subcommand(
            Command::new("category")
                .about("Built-in category catalog")
                .subcommand(Command::new("list").arg(type_arg(false))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .short('f')
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").short('o').required(true)),
            ),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions")
                    .about("Replace the ledger with a JSON export")
                    .arg(Arg::new("path").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check persisted data"))
        .subcommand(
            Command::new("config")
                .about("Preferences")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
