use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use orcamon_service::annotate::{AnnotateOptions, run_annotate};
use orcamon_service::config::{self, Config};
use orcamon_service::ingest::acartia::{self, feed_file_name};
use orcamon_service::logging::{self, LogLevel, Source};

/// Fetch and annotate orca sightings for the dashboard
#[derive(Parser, Debug)]
#[command(name = "orcamon")]
#[command(version)]
struct Args {
    /// Config file (defaults to ./orcamon.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append log entries to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug output with timestamps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the sightings feed and archive it as acartia_<date>.csv
    Fetch {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Annotate a sightings CSV and write yearly SRKW extracts
    Annotate {
        /// Input CSV (defaults to today's archived feed)
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Fetch, then annotate today's feed
    Run {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn fetch(config: &Config, out_dir: &Path, today: NaiveDate) -> Result<PathBuf, Box<dyn Error>> {
    let token = config::api_token(config).inspect_err(|e| {
        logging::log_fetch_failure("Token lookup", e);
    })?;
    let client = acartia::build_client(config.request_timeout_secs)?;
    Ok(acartia::run_fetch(&client, &config.feed_url, &token, out_dir, today)?)
}

fn annotate(config: &Config, input: &Path, out_dir: &Path, today: NaiveDate) -> Result<(), Box<dyn Error>> {
    let options = AnnotateOptions {
        tables: config::load_keywords(config)?,
        first_year: config.first_year,
        current_year: today.year(),
        on_bad_timestamp: config.on_bad_timestamp,
    };
    let outputs = run_annotate(input, out_dir, today, &options)?;
    logging::info(
        Source::Annotator,
        None,
        &format!(
            "Wrote {} and {} yearly extracts",
            outputs.annotated.display(),
            outputs.extracts.len()
        ),
    );
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = config::load_config(args.config.as_deref())?;
    logging::debug(
        Source::Config,
        None,
        &format!(
            "data_dir={} first_year={} on_bad_timestamp={:?}",
            config.data_dir.display(),
            config.first_year,
            config.on_bad_timestamp
        ),
    );
    let today = Local::now().date_naive();

    match args.command {
        Command::Fetch { out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.data_dir.clone());
            fetch(&config, &out_dir, today)?;
        }
        Command::Annotate { input, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.data_dir.clone());
            let input = input.unwrap_or_else(|| config.data_dir.join(feed_file_name(today)));
            annotate(&config, &input, &out_dir, today)?;
        }
        Command::Run { out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.data_dir.clone());
            let feed = fetch(&config, &out_dir, today)?;
            annotate(&config, &feed, &out_dir, today)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    config::load_env();

    let level = if args.verbose { LogLevel::Debug } else { LogLevel::Info };
    let log_file = args.log_file.as_ref().map(|p| p.display().to_string());
    logging::init_logger(level, log_file.as_deref(), args.verbose);

    run(args).inspect_err(|e| {
        logging::error(Source::System, None, &e.to_string());
    })
}
