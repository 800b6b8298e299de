mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::tax::{IncomeArgs, RequestArgs};

/// Slab tax calculation and deduction optimization
#[derive(Parser)]
#[command(
    name = "taxopt",
    version,
    about = "Slab tax calculation and deduction optimization",
    long_about = "Computes progressive slab tax with decimal precision, aggregates \
                  section-capped deductions and ranks tax-saving strategies by \
                  estimated savings at the taxpayer's marginal rate."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate slab tax for an income
    Tax(IncomeArgs),
    /// Look up the marginal rate for an income
    MarginalRate(IncomeArgs),
    /// Recommend deduction strategies
    Strategies(RequestArgs),
    /// Full optimization report (tax before/after deductions plus strategies)
    Report(RequestArgs),
    /// Document checklist and deadline reminders for the tax year
    Checklist(RequestArgs),
    /// Print the built-in configuration (FY 2024-25)
    DefaultConfig,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Tax(args) => commands::tax::run_tax(args),
        Commands::MarginalRate(args) => commands::tax::run_marginal_rate(args),
        Commands::Strategies(args) => commands::tax::run_strategies(args),
        Commands::Report(args) => commands::tax::run_report(args),
        Commands::Checklist(args) => commands::tax::run_checklist(args),
        Commands::DefaultConfig => commands::tax::run_default_config(),
        Commands::Version => {
            println!("taxopt {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
