//! git-big CLI - Command-line interface for git-big
//!
//! Commands:
//! - render: Write dark, light and default SVG graphs plus the levels JSON
//! - levels: Print trailing-year intensity levels
//! - validate: Report activity records that aggregation would skip

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use git_big::config::GraphConfig;
use git_big::input::ActivityInput;
use git_big::types::ActivityRecord;
use git_big::{GraphError, GITBIG_VERSION};

/// git-big - Workout activity as a contribution calendar
#[derive(Parser)]
#[command(name = "git-big")]
#[command(version = GITBIG_VERSION)]
#[command(about = "Render workout activity as a contribution-calendar SVG", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render graphs and levels JSON into the output directory
    Render {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        format: InputFormat,

        /// Output directory (overrides GITBIG_OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Reference date, YYYY-MM-DD (overrides GITBIG_END_DATE)
        #[arg(long)]
        end_date: Option<String>,

        /// Graph title (overrides GITBIG_TITLE)
        #[arg(long)]
        title: Option<String>,

        /// Five comma-separated hex colors (overrides GITBIG_PALETTE)
        #[arg(long)]
        palette: Option<String>,
    },

    /// Print trailing-year intensity levels as JSON
    Levels {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        format: InputFormat,

        /// Reference date, YYYY-MM-DD (overrides GITBIG_END_DATE)
        #[arg(long)]
        end_date: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Report records that would be skipped
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one activity per line)
    Ndjson,
    /// JSON array of activities
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
}

fn run(cli: Cli) -> Result<(), GitBigCliError> {
    let env_config = GraphConfig::from_env();

    match cli.command {
        Commands::Render {
            input,
            format,
            output_dir,
            end_date,
            title,
            palette,
        } => {
            let mut config = env_config;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if end_date.is_some() {
                config.end_date = end_date;
            }
            if title.is_some() {
                config.title = title;
            }
            if palette.is_some() {
                config.palette = palette;
            }
            cmd_render(&input, format, &config)
        }

        Commands::Levels {
            input,
            format,
            end_date,
            pretty,
        } => {
            let mut config = env_config;
            if end_date.is_some() {
                config.end_date = end_date;
            }
            cmd_levels(&input, format, &config, pretty)
        }

        Commands::Validate {
            input,
            format,
            json,
        } => cmd_validate(&input, format, json),
    }
}

fn cmd_render(input: &Path, format: InputFormat, config: &GraphConfig) -> Result<(), GitBigCliError> {
    // Fail on bad settings before touching input or output
    let end_date = config.resolve_end_date()?;
    let processor = config.processor()?;

    let records = read_records(input, format)?;
    let artifacts = processor.process(&records, end_date);

    let paths = config.output_paths();
    fs::create_dir_all(&config.output_dir)?;
    fs::write(&paths.svg, &artifacts.dark_svg)?;
    fs::write(&paths.dark_svg, &artifacts.dark_svg)?;
    fs::write(&paths.light_svg, &artifacts.light_svg)?;
    fs::write(&paths.levels, artifacts.levels_json()?)?;

    info!(
        output_dir = %config.output_dir.display(),
        %end_date,
        sessions = artifacts.session_count,
        "wrote contribution graphs"
    );
    println!("{}", serde_json::to_string_pretty(&paths)?);

    Ok(())
}

fn cmd_levels(
    input: &Path,
    format: InputFormat,
    config: &GraphConfig,
    pretty: bool,
) -> Result<(), GitBigCliError> {
    let end_date = config.resolve_end_date()?;
    let records = read_records(input, format)?;
    let artifacts = git_big::activities_to_graph(&records, end_date);

    if pretty {
        print!("{}", artifacts.levels_json()?);
    } else {
        println!("{}", serde_json::to_string(&artifacts.levels_by_date)?);
    }
    Ok(())
}

fn cmd_validate(input: &Path, format: InputFormat, json: bool) -> Result<(), GitBigCliError> {
    let records = read_records(input, format)?;
    let report = ActivityInput::validate(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Usable records:  {}", report.usable_records);
        println!("Skipped records: {}", report.skipped_records);

        if !report.issues.is_empty() {
            println!("\nSkipped:");
            for issue in &report.issues {
                println!(
                    "  - Record {} ({}): {}",
                    issue.index,
                    issue.local_date.as_deref().unwrap_or("no date"),
                    issue.reason
                );
            }
        }
    }

    if report.skipped_records > 0 {
        Err(GitBigCliError::ValidationFailed(report.skipped_records))
    } else {
        Ok(())
    }
}

// Helper functions

fn read_records(input: &Path, format: InputFormat) -> Result<Vec<ActivityRecord>, GitBigCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading activity records from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match format {
        InputFormat::Ndjson => ActivityInput::parse_ndjson(&input_data)?,
        InputFormat::Json => ActivityInput::parse_array(&input_data)?,
    };
    debug!(records = records.len(), "parsed activity input");
    Ok(records)
}

// Error types

#[derive(Debug)]
enum GitBigCliError {
    Io(io::Error),
    Graph(GraphError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for GitBigCliError {
    fn from(e: io::Error) -> Self {
        GitBigCliError::Io(e)
    }
}

impl From<GraphError> for GitBigCliError {
    fn from(e: GraphError) -> Self {
        GitBigCliError::Graph(e)
    }
}

impl From<serde_json::Error> for GitBigCliError {
    fn from(e: serde_json::Error) -> Self {
        GitBigCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GitBigCliError> for CliError {
    fn from(e: GitBigCliError) -> Self {
        match e {
            GitBigCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GitBigCliError::Graph(e) => {
                let hint = match &e {
                    GraphError::InvalidEndDate(_) | GraphError::DateParseError(_) => {
                        "Use a calendar date in YYYY-MM-DD form"
                    }
                    GraphError::InvalidTheme(_) => "Use dark or light",
                    GraphError::InvalidPalette(_) => {
                        "Pass five comma-separated hex colors, e.g. #161b22,#3d0f0f,#6b1a1a,#a12c2c,#d64545"
                    }
                    GraphError::ParseError(_) | GraphError::JsonError(_) => {
                        "Check the input format (--format json or ndjson)"
                    }
                };
                CliError {
                    code: "GRAPH_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            GitBigCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GitBigCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} record(s) would be skipped", count),
                hint: Some("Records need a start date and a non-negative duration".to_string()),
            },
        }
    }
}
