//! # ngoreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ngoreg_cli::check::{run_digest, run_validate, DigestArgs, ValidateArgs};
use ngoreg_cli::edit::{run_toggle, run_tree, ToggleArgs, TreeArgs};
use ngoreg_cli::resolve::{run_resolve, ResolveArgs};

/// NGO registry zone tooling.
///
/// Applies cascade toggles, inspects and validates intervention-zone lists,
/// and dry-runs the persistence resolver.
#[derive(Parser, Debug)]
#[command(name = "ngoreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Toggle one zone and print the next list.
    Toggle(ToggleArgs),

    /// Print a zone list as a tree.
    Tree(TreeArgs),

    /// Check a zone list for duplicates and orphans.
    Validate(ValidateArgs),

    /// Print the canonical digest of a zone list.
    Digest(DigestArgs),

    /// Show the rows a save would write, without a database.
    Resolve(ResolveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Toggle(args) => run_toggle(&args, &mut out),
        Commands::Tree(args) => run_tree(&args, &mut out),
        Commands::Validate(args) => run_validate(&args, &mut out),
        Commands::Digest(args) => run_digest(&args, &mut out),
        Commands::Resolve(args) => run_resolve(&args, &mut out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
