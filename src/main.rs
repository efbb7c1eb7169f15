//! Sumi-Probe main entry point
//!
//! This is the command-line interface for the Sumi-Probe page analyzer.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sumi_probe::config::{load_config_with_hash, Config};
use sumi_probe::output::{format_record, format_result_page, render, OutputFormat};
use sumi_probe::query::{build_list_plan, list_results, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use sumi_probe::storage::{delete_results, find_result, open_storage};
use sumi_probe::{Assembler, ProbeError, SqliteStorage};
use tracing_subscriber::EnvFilter;

/// Sumi-Probe: a single-page structural analyzer
///
/// Sumi-Probe fetches a web page, records its HTML version, title, heading
/// histogram, link counts and login form presence, and keeps the results
/// for later listing.
#[derive(Parser, Debug)]
#[command(name = "sumi-probe")]
#[command(version = "1.0.0")]
#[command(about = "A single-page structural analyzer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a page and store the result
    Crawl {
        /// Absolute http(s) URL of the page
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored results
    List {
        /// 1-based page number
        #[arg(long, default_value_t = DEFAULT_PAGE, allow_negative_numbers = true)]
        page: i64,

        /// Results per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
        page_size: i64,

        /// Case-sensitive substring matched against title and URL
        #[arg(long, default_value = "")]
        query: String,

        /// Sort as a JSON object, e.g. '{"page_title": true, "id": false}'
        #[arg(long)]
        sort: Option<String>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one stored result
    Show {
        id: i64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete stored results by id
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    let store = Arc::new(Mutex::new(storage));

    match cli.command {
        Command::Crawl { url, json } => handle_crawl(&config, store, &url, json).await,
        Command::List {
            page,
            page_size,
            query,
            sort,
            json,
        } => handle_list(&store, page, page_size, &query, sort.as_deref(), json),
        Command::Show { id, json } => handle_show(&store, id, json),
        Command::Delete { ids } => handle_delete(&store, &ids),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_probe=info,warn"),
            1 => EnvFilter::new("sumi_probe=debug,info"),
            2 => EnvFilter::new("sumi_probe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_crawl(
    config: &Config,
    store: Arc<Mutex<SqliteStorage>>,
    url: &str,
    json: bool,
) -> anyhow::Result<()> {
    let assembler = Assembler::from_config(config, store)?;
    let outcome = assembler.crawl(url).await;

    println!(
        "{}",
        render(
            &outcome.record,
            OutputFormat::from_json_flag(json),
            format_record
        )?
    );

    match outcome.error {
        None => Ok(()),
        Some(error) => fail(error),
    }
}

fn handle_list(
    store: &Mutex<SqliteStorage>,
    page: i64,
    page_size: i64,
    query: &str,
    sort: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let plan = match build_list_plan(page, page_size, query, sort) {
        Ok(plan) => plan,
        Err(error) => return fail(error),
    };
    let result_page = match list_results(store, &plan) {
        Ok(result_page) => result_page,
        Err(error) => return fail(error),
    };

    println!(
        "{}",
        render(&result_page, OutputFormat::from_json_flag(json), |p| {
            format_result_page(p, plan.page, plan.page_size)
        })?
    );
    Ok(())
}

fn handle_show(store: &Mutex<SqliteStorage>, id: i64, json: bool) -> anyhow::Result<()> {
    let record = match find_result(store, id) {
        Ok(Some(record)) => record,
        Ok(None) => bail!("[{}] no crawl result with id {}", reqwest::StatusCode::NOT_FOUND, id),
        Err(error) => return fail(error),
    };

    println!(
        "{}",
        render(&record, OutputFormat::from_json_flag(json), format_record)?
    );
    Ok(())
}

fn handle_delete(store: &Mutex<SqliteStorage>, ids: &[i64]) -> anyhow::Result<()> {
    match delete_results(store, ids) {
        Ok(deleted) => {
            println!("Deleted {} crawl result(s)", deleted);
            Ok(())
        }
        Err(error) => fail(error),
    }
}

/// Reports a probe error with its status class
fn fail(error: ProbeError) -> anyhow::Result<()> {
    tracing::error!("{}", error);
    bail!("[{}] {}", error.status_code(), error)
}
