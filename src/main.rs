//! Harvest main entry point
//!
//! This is the command-line interface for the Harvest fetcher and table writer.

use anyhow::Context;
use clap::{Parser, Subcommand};
use harvest::config::{load_config, validate, Compression, Config};
use harvest::crawler::{crawl, FetchResult};
use harvest::ingest::{ingest, read_input, InputFormat};
use harvest::output::{
    format_preview, print_crawl_statistics, print_table_statistics, CrawlStatistics,
    TableStatistics,
};
use harvest::table::{read_table, TableRecord, TableWriter, CREATED_AT_KEY, SOURCE_KEY};
use harvest::targets::load_targets;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Harvest: fetch URIs in parallel and save the results as Parquet
#[derive(Parser, Debug)]
#[command(name = "harvest")]
#[command(version)]
#[command(about = "Fetch URIs in parallel and save the results as Parquet", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

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
    /// Fetch every URI in a file and write one row per URI
    Crawl {
        /// File with one URI per line
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output Parquet file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Compression codec for the output
        #[arg(long, value_enum)]
        compression: Option<Compression>,
    },

    /// Save CSV or JSON read from stdin as a Parquet file
    Ingest {
        /// Output Parquet file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Input format; detected from the input if omitted
        #[arg(short, long, value_enum)]
        format: Option<InputFormat>,

        /// Compression codec for the output
        #[arg(long, value_enum)]
        compression: Option<Compression>,
    },

    /// Show the schema, statistics and first rows of a Parquet file
    Inspect {
        /// Parquet file to read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of rows to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    match cli.command {
        Command::Crawl {
            input,
            output,
            workers,
            timeout,
            compression,
        } => {
            let mut config = config;
            if let Some(workers) = workers {
                config.fetch.workers = workers;
            }
            if let Some(timeout) = timeout {
                config.fetch.timeout_secs = timeout;
            }
            if let Some(compression) = compression {
                config.output.compression = compression;
            }
            validate(&config)?;
            handle_crawl(&input, &output, &config, cli.quiet).await
        }
        Command::Ingest {
            output,
            format,
            compression,
        } => {
            let mut config = config;
            if let Some(compression) = compression {
                config.output.compression = compression;
            }
            handle_ingest(&output, format, &config)
        }
        Command::Inspect { file, limit } => handle_inspect(&file, limit),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only command output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harvest=info,warn"),
            1 => EnvFilter::new("harvest=debug,info"),
            2 => EnvFilter::new("harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the crawl command: fetches every URI and writes the results
async fn handle_crawl(
    input: &Path,
    output: &Path,
    config: &Config,
    quiet: bool,
) -> anyhow::Result<()> {
    let targets = load_targets(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    tracing::info!(
        "Crawling {} URIs from {} with {} workers",
        targets.len(),
        input.display(),
        config.fetch.workers
    );

    let report = crawl(&targets, output, config).await?;

    println!(
        "Crawled {} URLs. Results saved to {}",
        report.rows,
        report.output.display()
    );
    if !quiet {
        print_crawl_statistics(&report.statistics);
    }

    Ok(())
}

/// Handles the ingest command: reads stdin and writes it as a table
fn handle_ingest(output: &Path, format: Option<InputFormat>, config: &Config) -> anyhow::Result<()> {
    let raw = read_input(std::io::stdin().lock()).context("Failed to read stdin")?;

    let writer = TableWriter::new(&config.output);
    let report = ingest(&raw, format, output, &writer)?;

    println!("Saved {} rows to {}", report.rows, report.output.display());

    Ok(())
}

/// Handles the inspect command: prints a summary of a table file
fn handle_inspect(file: &Path, limit: usize) -> anyhow::Result<()> {
    let contents =
        read_table(file).with_context(|| format!("Failed to read {}", file.display()))?;

    println!("File: {}", file.display());
    if let Some(source) = contents.metadata_value(SOURCE_KEY) {
        println!("Source: {}", source);
    }
    if let Some(created_at) = contents.metadata_value(CREATED_AT_KEY) {
        println!("Created: {}", created_at);
    }
    println!();

    print_table_statistics(&TableStatistics::from_contents(&contents));

    // Crawl output gets the fetch breakdown as well
    let is_crawl_table = FetchResult::field_names()
        .iter()
        .all(|name| contents.schema.index_of(name).is_ok());
    if is_crawl_table {
        let results: Vec<FetchResult> = contents.to_rows()?.to_records()?;
        print_crawl_statistics(&CrawlStatistics::from_results(&results));
    }

    if limit > 0 {
        println!("{}", format_preview(&contents, limit)?);
    }

    Ok(())
}
