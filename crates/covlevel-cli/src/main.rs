//! covlevel CLI entry point.
//!
//! Provides command-line tools for working with coverage rule files:
//! - `covlevel check` - Validate and compile rule files
//! - `covlevel level` - Resolve coverage levels for paths
//! - `covlevel votes` - Look up required approval votes
//! - `covlevel summary` - Count paths per level for several locales

mod commands;
mod output;

use std::process::exit;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{
    CheckArgs, LevelArgs, SummaryArgs, VotesArgs, run_check, run_level, run_summary, run_votes,
};
use tracing_subscriber::EnvFilter;

/// Coverage rule file tools.
#[derive(Debug, Parser)]
#[command(name = "covlevel")]
#[command(about = "Coverage-level rule file tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse and compile rule files
    Check(CheckArgs),
    /// Print the coverage level of each path
    Level(LevelArgs),
    /// Print the votes required to approve a path
    Votes(VotesArgs),
    /// Count paths per coverage level for each locale
    Summary(SummaryArgs),
}

/// Set up color output based on user preference.
fn setup_colors(color_when: ColorWhen) {
    match color_when {
        ColorWhen::Auto => {
            // owo-colors automatically checks TTY, NO_COLOR, FORCE_COLOR
        }
        ColorWhen::Always => {
            owo_colors::set_override(true);
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
        }
    }
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_colors(cli.color);
    setup_logging(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let result = match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Level(args) => run_level(args),
        Commands::Votes(args) => run_votes(args),
        Commands::Summary(args) => run_summary(args),
    };

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{e:?}");
            exit(exitcode::SOFTWARE);
        }
    }
}
