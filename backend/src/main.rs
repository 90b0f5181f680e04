//! Ironlog CLI - Workout export analytics
//!
//! # Main Commands
//!
//! ```bash
//! ironlog stats workouts.csv          # Full statistics as JSON
//! ironlog fetch --stats               # Same, from the Hevy API
//! ironlog serve                       # Start HTTP server (port 3000)
//! ```
//!
//! # Other Commands
//!
//! ```bash
//! ironlog parse workouts.csv          # Workout tree as JSON
//! ironlog records workouts.csv        # Personal-record events
//! ironlog records workouts.csv --bests
//! ironlog top workouts.csv -n 5       # Top exercises by volume
//! ```
//!
//! Logs go to stderr, results to stdout (or `--output`).

use clap::{Args, Parser, Subcommand, ValueEnum};
use ironlog::api::logs::{log_info, log_success, LogStage};
use ironlog::{
    compute_statistics, fetch_all, ingest_file, personal_bests, personal_record_events,
    prs_over_time, top_exercises, AnalyticsOptions, DatePolicy, HevyClient, IngestOptions,
    IngestReport, PrPeriod, Workout,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ironlog")]
#[command(about = "Analyze workout-tracker CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads an export.
#[derive(Args)]
struct IngestArgs {
    /// Input CSV export
    input: PathBuf,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Skip rows with unparseable timestamps instead of using the current time
    #[arg(long)]
    strict_dates: bool,

    /// Reject exports carrying unknown columns
    #[arg(long)]
    strict_columns: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl IngestArgs {
    fn options(&self) -> IngestOptions {
        IngestOptions {
            delimiter: self.delimiter,
            date_policy: if self.strict_dates { DatePolicy::Strict } else { DatePolicy::Lenient },
            strict_columns: self.strict_columns,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Workout,
    Week,
    Month,
}

impl From<PeriodArg> for PrPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Workout => PrPeriod::Workout,
            PeriodArg::Week => PrPeriod::Week,
            PeriodArg::Month => PrPeriod::Month,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an export and output the workout tree as JSON
    Parse {
        #[command(flatten)]
        ingest: IngestArgs,
    },

    /// Compute training statistics
    Stats {
        #[command(flatten)]
        ingest: IngestArgs,

        /// Length of the top-exercise ranking
        #[arg(long, default_value = "10")]
        top: usize,

        /// Bucket size of the PR timeline
        #[arg(long, value_enum, default_value = "workout")]
        period: PeriodArg,
    },

    /// List personal records
    Records {
        #[command(flatten)]
        ingest: IngestArgs,

        /// Output the best value per exercise instead of every event
        #[arg(long, conflicts_with = "timeline")]
        bests: bool,

        /// Output PR counts over time
        #[arg(long)]
        timeline: bool,

        /// Bucket size for --timeline
        #[arg(long, value_enum, default_value = "workout")]
        period: PeriodArg,
    },

    /// Rank exercises by total volume
    Top {
        #[command(flatten)]
        ingest: IngestArgs,

        /// Number of exercises
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Fetch workouts from the Hevy API (needs HEVY_API_KEY)
    Fetch {
        /// Stop after this many pages
        #[arg(long)]
        pages: Option<u32>,

        /// Workouts per page (1-10)
        #[arg(long, default_value = "10")]
        page_size: u32,

        /// Output statistics instead of workouts
        #[arg(long)]
        stats: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { ingest } => cmd_parse(&ingest).await,

        Commands::Stats { ingest, top, period } => cmd_stats(&ingest, top, period.into()).await,

        Commands::Records {
            ingest,
            bests,
            timeline,
            period,
        } => cmd_records(&ingest, bests, timeline.then_some(period.into())).await,

        Commands::Top { ingest, limit } => cmd_top(&ingest, limit).await,

        Commands::Fetch {
            pages,
            page_size,
            stats,
            output,
        } => cmd_fetch(pages, page_size, stats, output.as_deref()).await,

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn load(args: &IngestArgs) -> Result<IngestReport, Box<dyn std::error::Error>> {
    Ok(ingest_file(&args.input, args.options()).await?)
}

async fn cmd_parse(args: &IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report = load(args).await?;
    write_json(&report.workouts, args.output.as_deref())
}

async fn cmd_stats(
    args: &IngestArgs,
    top_n: usize,
    pr_period: PrPeriod,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = load(args).await?;
    let stats = analyze(&report.workouts, &AnalyticsOptions { top_n, pr_period });
    write_json(&stats, args.output.as_deref())
}

async fn cmd_records(
    args: &IngestArgs,
    bests: bool,
    timeline: Option<PrPeriod>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = load(args).await?;
    let output = args.output.as_deref();

    if let Some(period) = timeline {
        return write_json(&prs_over_time(&report.workouts, period), output);
    }
    if bests {
        return write_json(&personal_bests(&report.workouts), output);
    }

    let events = personal_record_events(&report.workouts);
    log_success(LogStage::Analyze, format!("{} personal records", events.len()));
    write_json(&events, output)
}

async fn cmd_top(args: &IngestArgs, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let report = load(args).await?;
    write_json(&top_exercises(&report.workouts, limit), args.output.as_deref())
}

async fn cmd_fetch(
    pages: Option<u32>,
    page_size: u32,
    stats: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = HevyClient::from_env()?.with_page_size(page_size);
    let workouts = fetch_all(&client, pages).await?;

    if stats {
        write_json(&analyze(&workouts, &AnalyticsOptions::default()), output)
    } else {
        write_json(&workouts, output)
    }
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    ironlog::server::start_server(port).await
}

fn analyze(workouts: &[Workout], options: &AnalyticsOptions) -> ironlog::WorkoutStatistics {
    log_info(LogStage::Analyze, format!("Analyzing {} workouts", workouts.len()));
    let stats = compute_statistics(workouts, options);
    log_success(
        LogStage::Analyze,
        format!("{} kg total volume, {} sets", stats.total_volume, stats.total_sets),
    );
    stats
}

fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    write_output(&json, path)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
