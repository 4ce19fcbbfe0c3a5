//! memstat CLI: replay compilation traces and report peak arena usage.

use clap::{Parser, Subcommand, ValueEnum};
use memstat_core::config::{MemStatCommand, StatConfig};
use memstat_core::symbol::SymbolTable;
use memstat_exec::{parse_yaml_trace, replay, StatisticsService};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memstat")]
#[command(about = "Peak arena memory statistics for method compilations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a compilation trace and print the statistics report
    Replay {
        /// Path to the trace YAML file
        #[arg(short, long)]
        trace: PathBuf,

        /// Compiler worker threads (overrides trace and config)
        #[arg(long)]
        threads: Option<usize>,

        /// Print sizes with K/M/G units
        #[arg(short = 'H', long)]
        human_readable: bool,

        /// Only report methods whose peak reached this many bytes
        #[arg(long)]
        min_size: Option<usize>,

        /// MemStat command `mode,pattern` (repeatable, appended to MEMSTAT_COMMANDS)
        #[arg(long = "command")]
        commands: Vec<String>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Validate a trace YAML file
    Validate {
        /// Path to the trace YAML file
        #[arg(short, long)]
        trace: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace,
            threads,
            human_readable,
            min_size,
            commands,
            format,
        } => {
            if let Err(e) = run_replay(&trace, threads, human_readable, min_size, &commands, format)
            {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { trace } => {
            if let Err(e) = validate_trace(&trace) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
            println!("✓ Trace is valid");
        }
    }
}

fn run_replay(
    trace_path: &PathBuf,
    threads: Option<usize>,
    human_readable: bool,
    min_size: Option<usize>,
    commands: &[String],
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(trace_path)?;
    let trace = parse_yaml_trace(&yaml_content)?;

    let mut config = StatConfig::from_env()?;
    apply_overrides(&mut config, human_readable, min_size, commands)?;
    // Replaying is pointless with the statistic off.
    config.enabled = true;
    let threads = threads.or(trace.threads).unwrap_or(config.threads);

    let service = StatisticsService::install(&config);
    let symbols = SymbolTable::new();
    let outcome = replay(service, &symbols, &trace, &config, threads)?;
    tracing::info!(
        compilations = outcome.compilations,
        tracked = outcome.tracked,
        threads,
        "replay finished"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Text => service.report(&mut out, config.human_readable, config.min_size)?,
        Format::Json => {
            let json = service.report_json(config.min_size)?;
            writeln!(out, "{:#}", json)?;
        }
    }
    Ok(())
}

fn validate_trace(trace_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(trace_path)?;
    let _ = parse_yaml_trace(&yaml_content)?;
    Ok(())
}

fn apply_overrides(
    cfg: &mut StatConfig,
    human_readable: bool,
    min_size: Option<usize>,
    commands: &[String],
) -> memstat_core::Result<()> {
    if human_readable {
        cfg.human_readable = true;
    }
    if let Some(min) = min_size {
        cfg.min_size = min;
    }
    for c in commands {
        cfg.commands.push(MemStatCommand::parse(c)?);
    }
    Ok(())
}
