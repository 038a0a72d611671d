//! Pulse CLI - Command-line interface for Survey Pulse
//!
//! Commands:
//! - facets: List selector options and the age range of a dataset
//! - grid: Print the 12 heatmap cells for one filter state
//! - insights: Print the insight narrative or summary
//! - export: Write the filtered report
//! - replay: Drive a session from filter events on stdin (one frame per event)
//! - columns: Print the expected column headers

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use survey_pulse::export::DEFAULT_EXPORT_FILE;
use survey_pulse::filter::{parse_gender_selection, parse_platform_selection, platform_label};
use survey_pulse::types::FilterState;
use survey_pulse::{FilterEvent, HeatmapSession, PulseConfig, PulseError, PRODUCER_NAME, PULSE_VERSION};

/// Pulse - Filter-reactive heatmap over social-media and mental-health survey data
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = PULSE_VERSION)]
#[command(about = "Cross-tabulate survey responses into a time-spent x distress grid", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List gender and platform options and the age range
    Facets {
        /// Survey CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the heatmap cells for one filter state
    Grid {
        /// Survey CSV file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: GridFormat,
    },

    /// Print the insight narrative for one filter state
    Insights {
        /// Survey CSV file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the filtered report
    Export {
        /// Survey CSV file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },

    /// Read filter events from stdin and emit one JSON frame per event
    Replay {
        /// Survey CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Buffer frames instead of flushing after each one
        #[arg(long)]
        no_flush: bool,
    },

    /// Print the expected column headers
    Columns,
}

#[derive(Args)]
struct FilterArgs {
    /// Age ceiling (defaults to the configured value)
    #[arg(long)]
    max_age: Option<u32>,

    /// Gender selector (All, Male, Female)
    #[arg(long, default_value = "All")]
    gender: String,

    /// Platform selector (All or a platform token)
    #[arg(long, default_value = "All")]
    platform: String,
}

impl FilterArgs {
    fn to_state(&self, config: &PulseConfig) -> Result<FilterState, PulseCliError> {
        Ok(FilterState {
            max_age: self.max_age.unwrap_or(config.default_max_age),
            gender: parse_gender_selection(&self.gender)?,
            platform: parse_platform_selection(&self.platform),
        })
    }

    fn events(&self, config: &PulseConfig) -> Result<Vec<FilterEvent>, PulseCliError> {
        let state = self.to_state(config)?;
        Ok(vec![
            FilterEvent::MaxAge(state.max_age),
            FilterEvent::Gender(state.gender),
            FilterEvent::Platform(state.platform),
        ])
    }
}

#[derive(Clone, ValueEnum)]
enum GridFormat {
    /// One aligned row per cell
    Text,
    /// Pretty-printed JSON array of cells
    Json,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PULSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    let config = match cli.config.as_deref() {
        Some(path) => PulseConfig::load(path)?,
        None => PulseConfig::default(),
    };
    tracing::debug!(producer = PRODUCER_NAME, version = PULSE_VERSION, "pulse starting");

    match cli.command {
        Commands::Facets { input, json } => cmd_facets(&input, &config, json),
        Commands::Grid { input, filter, format } => cmd_grid(&input, &config, &filter, format),
        Commands::Insights { input, filter, json } => cmd_insights(&input, &config, &filter, json),
        Commands::Export { input, filter, output } => cmd_export(&input, &config, &filter, &output),
        Commands::Replay { input, no_flush } => cmd_replay(&input, &config, !no_flush),
        Commands::Columns => cmd_columns(&config),
    }
}

fn open_session(input: &Path, config: &PulseConfig) -> Result<HeatmapSession, PulseCliError> {
    let session = HeatmapSession::from_csv_path(input, config)?;
    if session.records().is_empty() {
        return Err(PulseCliError::NoRecords);
    }
    Ok(session)
}

/// Open a session and bring it to the filter state given on the command line
fn filtered_session(
    input: &Path,
    config: &PulseConfig,
    filter: &FilterArgs,
) -> Result<HeatmapSession, PulseCliError> {
    let mut session = open_session(input, config)?;
    for event in filter.events(config)? {
        session.apply(&event);
    }
    Ok(session)
}

fn cmd_facets(input: &Path, config: &PulseConfig, json: bool) -> Result<(), PulseCliError> {
    let session = open_session(input, config)?;
    let facets = session.facets();

    if json {
        println!("{}", serde_json::to_string_pretty(facets)?);
        return Ok(());
    }

    println!("Gender:   {}", facets.gender_options().join(", "));
    let platforms: Vec<String> = facets
        .platform_options()
        .iter()
        .map(|p| platform_label(p))
        .collect();
    println!("Platform: {}", platforms.join(", "));
    match facets.age_range {
        Some((low, high)) => println!("Age:      {low} to {high}"),
        None => println!("Age:      no known ages"),
    }
    Ok(())
}

fn cmd_grid(
    input: &Path,
    config: &PulseConfig,
    filter: &FilterArgs,
    format: GridFormat,
) -> Result<(), PulseCliError> {
    let session = filtered_session(input, config, filter)?;
    let cells = session.rendered_cells();

    match format {
        GridFormat::Json => println!("{}", serde_json::to_string_pretty(cells)?),
        GridFormat::Text => {
            let colors = session.colors();
            for cell in cells {
                let value = cell.value.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<5} {:<12} {:>2}  {:<8} {}",
                    cell.time_bucket.as_str(),
                    cell.metric.as_str(),
                    value,
                    cell.representative_label(),
                    colors.fill(cell.value)
                );
            }
        }
    }
    Ok(())
}

fn cmd_insights(
    input: &Path,
    config: &PulseConfig,
    filter: &FilterArgs,
    json: bool,
) -> Result<(), PulseCliError> {
    let session = filtered_session(input, config, filter)?;
    let insights = session.aggregate().insights;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else {
        println!("{}", insights.narrative());
    }
    Ok(())
}

fn cmd_export(
    input: &Path,
    config: &PulseConfig,
    filter: &FilterArgs,
    output: &Path,
) -> Result<(), PulseCliError> {
    let session = filtered_session(input, config, filter)?;
    let report = session.export();

    if output.to_string_lossy() == "-" {
        print!("{}", report);
    } else {
        fs::write(output, report)?;
        tracing::info!(path = %output.display(), records = session.filtered().len(), "report written");
    }
    Ok(())
}

fn cmd_replay(input: &Path, config: &PulseConfig, flush: bool) -> Result<(), PulseCliError> {
    let mut session = open_session(input, config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    tracing::info!(session_id = %session.id(), "replay started");

    let frame = session.render();
    writeln!(stdout, "{}", serde_json::to_string(&frame)?)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event: FilterEvent = trimmed.parse()?;
        let frame = session.apply(&event);
        writeln!(stdout, "{}", serde_json::to_string(&frame)?)?;
        if flush {
            stdout.flush()?;
        }
    }

    let frame = session.teardown();
    writeln!(stdout, "{}", serde_json::to_string(&frame)?)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_columns(config: &PulseConfig) -> Result<(), PulseCliError> {
    for (field, header) in config.columns.entries() {
        println!("{:<12} {}", field, header);
    }
    Ok(())
}

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Pulse(PulseError),
    Json(serde_json::Error),
    NoRecords,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<PulseError> for PulseCliError {
    fn from(e: PulseError) -> Self {
        PulseCliError::Pulse(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Pulse(e) => {
                let (code, hint) = match &e {
                    PulseError::MissingColumn(_) => {
                        ("MISSING_COLUMN", "Run 'pulse columns' to list the expected headers")
                    }
                    PulseError::InvalidFilter(_) => {
                        ("INVALID_FILTER", "Use age=N, gender=All|Male|Female or platform=P")
                    }
                    PulseError::ConfigError(_) => ("CONFIG_ERROR", "Check the --config file"),
                    PulseError::Csv(_) => ("CSV_ERROR", "Ensure the input is a comma-separated file with a header row"),
                    PulseError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                    PulseError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    PulseError::SnapshotUnsupported => {
                        ("SNAPSHOT_UNSUPPORTED", "Use 'pulse export' for a text report")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No survey responses found in input".to_string(),
                hint: Some("Ensure the input file has rows below the header".to_string()),
            },
        }
    }
}
