use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use cyclewise::config::{AppConfig, OutputFormat};
use cyclewise::logging::{init_logging, LogFormat, LogLevel};
use cyclewise::{CyclePrediction, CycleState, LengthPolicy, PhaseName, PhaseSlot};

/// Cyclewise - menstrual cycle phase calculator
///
/// Splits a cycle into menstruation, fertile window, ovulation and luteal
/// phase from the last period's start date and the usual cycle length.
#[derive(Parser)]
#[command(name = "cyclewise")]
#[command(version)]
#[command(about = "Menstrual cycle phase calculator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log level (error, warn, info, debug, trace); overrides -v and the config
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    /// Log format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CycleArgs {
    /// First day of the most recent period (YYYY-MM-DD)
    #[arg(short, long)]
    start: String,

    /// Typical cycle length in days (defaults to the configured length)
    #[arg(short, long)]
    length: Option<u32>,

    /// Clamp lengths outside 15-60 days instead of rejecting them
    #[arg(long)]
    clamp: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show phase dates and the next period
    Predict(CycleArgs),

    /// Show a month with each day's phase
    Calendar {
        #[command(flatten)]
        cycle: CycleArgs,

        /// Month to show (YYYY-MM, defaults to the start date's month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show phase durations and relative conception chance
    Charts(CycleArgs),

    /// Show the cycle day and phase for a date
    Status {
        #[command(flatten)]
        cycle: CycleArgs,

        /// Date to look up (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List the phase metadata table
    Phases,

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the active configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config subcommand must work before any file exists.
    let config = match cli.command {
        Commands::Config { .. } => AppConfig::load_or_default(cli.config.as_deref())?,
        _ => AppConfig::load(cli.config.as_deref())?,
    };

    let mut log_config = config.logging.clone();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    init_logging(&log_config)?;

    let json = cli.json || config.display.format == OutputFormat::Json;

    match cli.command {
        Commands::Predict(args) => {
            let state = open_state(&args, &config)?;
            if json {
                println!("{}", state.export_json().map_err(|e| anyhow!(e))?);
            } else {
                print_prediction(&state)?;
            }
        }

        Commands::Calendar { cycle, month } => {
            let state = open_state(&cycle, &config)?;
            let prediction = state.current().map_err(|e| anyhow!(e))?;
            let first = match month {
                Some(m) => NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
                    .with_context(|| format!("Invalid month {m:?}, expected YYYY-MM"))?,
                None => prediction.start_date,
            };
            let view = state
                .get_month(first.year(), first.month())
                .map_err(|e| anyhow!(e))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", first.format("%B %Y").to_string().bold());
                for day in &view.days {
                    let label = day
                        .slot
                        .map(|slot| paint(slot, slot.metadata().short_name))
                        .unwrap_or_else(|| "-".dimmed());
                    let next = if day.next_period {
                        " (next period)".red().to_string()
                    } else {
                        String::new()
                    };
                    println!("  {}  {}{}", day.date.format("%a %d"), label, next);
                }
            }
        }

        Commands::Charts(args) => {
            let state = open_state(&args, &config)?;
            let pie = state.get_pie().map_err(|e| anyhow!(e))?;
            let bars = state.get_bars().map_err(|e| anyhow!(e))?;

            if json {
                let charts = serde_json::json!({ "pie": pie, "bars": bars });
                println!("{}", serde_json::to_string_pretty(&charts)?);
            } else {
                println!("{}", "Days per phase".bold());
                for slice in &pie {
                    println!("  {:<18} {:>3} days", slice.name, slice.days);
                }
                println!("{}", "Relative chance to conceive".bold());
                for bar in &bars {
                    let width = usize::from(bar.chance / 5).max(1);
                    println!("  {:<14} {:>3} {}", bar.name, bar.chance, "#".repeat(width));
                }
            }
        }

        Commands::Status { cycle, date } => {
            let state = open_state(&cycle, &config)?;
            let date = date.unwrap_or_else(|| {
                chrono::Local::now()
                    .date_naive()
                    .format("%Y-%m-%d")
                    .to_string()
            });
            let status = state.get_status(&date).map_err(|e| anyhow!(e))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                match status {
                    Some(status) => println!(
                        "{}: cycle day {}, {} (chance {})",
                        status.date,
                        status.cycle_day,
                        paint(status.slot, status.phase_name),
                        status.conception_weight
                    ),
                    None => println!("{date} is outside the entered cycle"),
                }
            }
        }

        Commands::Phases => {
            let table: Vec<_> = PhaseName::ALL
                .into_iter()
                .map(|phase| (phase.key(), phase.metadata()))
                .collect();

            if json {
                let rows: Vec<serde_json::Value> = table
                    .iter()
                    .map(|(key, meta)| serde_json::json!({ "phase": key, "metadata": meta }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (key, meta) in table {
                    println!(
                        "  {:<13} {:<15} {:>3}  {:<10} {}",
                        key, meta.name, meta.conception_weight, meta.color_token, meta.description
                    );
                }
            }
        }

        Commands::Config { init, show } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            let active = if init {
                let written = AppConfig::init_file(&path)?;
                println!("{} {}", "Wrote".green(), path.display());
                written
            } else {
                config
            };
            if show || !init {
                println!("{}", toml::to_string_pretty(&active)?);
            }
        }
    }

    Ok(())
}

fn open_state(args: &CycleArgs, config: &AppConfig) -> Result<CycleState> {
    let policy = if args.clamp {
        LengthPolicy::Clamp
    } else {
        config.cycle.length_policy
    };
    let length = args.length.unwrap_or(config.cycle.default_length);

    let state = CycleState::new(policy);
    state.submit(&args.start, length).map_err(|e| anyhow!(e))?;
    Ok(state)
}

fn print_prediction(state: &CycleState) -> Result<()> {
    let prediction: CyclePrediction = state.current().map_err(|e| anyhow!(e))?;
    let summary = state.get_summary().map_err(|e| anyhow!(e))?;

    println!(
        "{} {} ({} days)",
        "Cycle starting".bold(),
        prediction.start_date,
        prediction.cycle_length
    );
    for (slot, interval) in prediction.segments() {
        println!(
            "  {:<18} {} .. {}  ({} days)",
            paint(slot, slot.metadata().name),
            interval.start,
            interval.end,
            interval.days()
        );
    }
    for (phase, interval) in prediction.phases.iter() {
        if interval.is_none() && prediction.combined_remainder.is_none() {
            println!("  {:<18} {}", phase.metadata().name, "none this cycle".dimmed());
        }
    }
    println!("{} {}", "Next period".bold(), summary.next_period_label);
    Ok(())
}

fn paint(slot: PhaseSlot, text: &str) -> ColoredString {
    match slot.metadata().color_token {
        "--chart-1" => text.red(),
        "--chart-2" => text.green(),
        "--chart-3" => text.bright_green().bold(),
        "--chart-4" => text.blue(),
        _ => text.normal(),
    }
}
