//! Entry point for the `bask` CLI.
//!
//! Parses arguments, initializes logging, and dispatches to the command
//! implementations. Failures are rendered as miette diagnostics.

use clap::Parser;
use miette::Result;

mod cli;
mod commands;
mod error;
mod logger;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logger::init(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build(build_args),
        cli::Command::Plan(plan_args) => commands::plan(plan_args),
    };
    result.map_err(error::to_report)
}
