// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod list;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use quotedesk_app::{AppState, QuoteQuery, StatusFilter};
use quotedesk_db::Store;
use quotedesk_testkit::{QuoteFaker, seed_demo_quotes};
use runtime::DbRuntime;
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;

const DEMO_SEED: u64 = 42;
const DEMO_QUOTE_COUNT: usize = 12;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `quotedesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    logging::init_logging(config.log_level(), &config.log_path()?)?;

    let mut store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or QUOTEDESK_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    store.set_number_prefix(config.number_prefix())?;
    tracing::info!(db_path = %db_path.display(), demo = options.demo, "store opened");

    if options.demo {
        let mut faker = QuoteFaker::new(DEMO_SEED);
        let today = OffsetDateTime::now_utc().date();
        seed_demo_quotes(&store, &mut faker, today, DEMO_QUOTE_COUNT)
            .context("seed demo quotes")?;
    }

    if options.check_only {
        return Ok(());
    }

    if let Some(query) = options.list {
        let quotes = store.list_quotes()?;
        print!("{}", list::render_quote_list(&quotes, &query));
        return Ok(());
    }

    let mut state = AppState::default();
    let mut runtime = DbRuntime::new(&store, config.validity_days());
    quotedesk_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    /// Set by `--list`; prints instead of starting the TUI.
    list: Option<QuoteQuery>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        list: None,
    };
    let mut list_requested = false;
    let mut search: Option<String> = None;
    let mut status: Option<StatusFilter> = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                list_requested = true;
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--search requires a search term"))?;
                search = Some(value.as_ref().to_owned());
            }
            "--status" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--status requires one of all, pending, approved, rejected")
                })?;
                let raw = value.as_ref();
                let filter = StatusFilter::parse(raw).ok_or_else(|| {
                    anyhow!(
                        "unknown status {raw:?} for --status; use one of all, pending, approved, rejected"
                    )
                })?;
                status = Some(filter);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if list_requested {
        options.list = Some(QuoteQuery::new(
            search.unwrap_or_default(),
            status.unwrap_or_default(),
        ));
    } else if search.is_some() || status.is_some() {
        return Err(anyhow!(
            "--search and --status only apply to --list; add --list and retry"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("quotedesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo quotes (in-memory)");
    println!("  --check                  Validate config + DB and exit");
    println!("  --list                   Print quotes instead of starting the UI");
    println!("  --search <term>          With --list: match client, company or number");
    println!("  --status <status>        With --list: all, pending, approved or rejected");
    println!("  --help                   Show this help");
}
