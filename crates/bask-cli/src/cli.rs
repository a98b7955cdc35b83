//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use bask::BuildMode;

/// Bask - deterministic static-asset builds
#[derive(Parser, Debug)]
#[command(
    name = "bask",
    version,
    about = "Deterministic static-asset build orchestration",
    long_about = "Bask turns a tree of scripts, stylesheets and fonts into a versioned\n\
                  set of deployable bundles. Script names embed a revision-derived tag,\n\
                  stylesheets are content-hashed in production, and a machine-consumable\n\
                  manifest describes every emitted artifact."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a full build and write the output tree
    Build(BuildArgs),

    /// Assemble and print the build plan without touching the output tree
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the plan as JSON instead of a human-readable summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to the build declarations
    #[arg(short, long, default_value = "bask.toml", value_name = "FILE")]
    pub config: PathBuf,

    /// Build mode; defaults to BASK_MODE, then development
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,
}

impl CommonArgs {
    pub fn mode(&self) -> BuildMode {
        match self.mode {
            Some(ModeArg::Development) => BuildMode::Development,
            Some(ModeArg::Production) => BuildMode::Production,
            None => BuildMode::from_env(),
        }
    }
}

/// Build mode as a CLI value.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Development,
    Production,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_with_defaults() {
        let cli = Cli::try_parse_from(["bask", "build"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected the build command");
        };
        assert_eq!(args.common.config, PathBuf::from("bask.toml"));
        assert!(args.common.mode.is_none());
    }

    #[test]
    fn mode_flag_overrides_the_environment() {
        let cli = Cli::try_parse_from(["bask", "build", "--mode", "production"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected the build command");
        };
        assert_eq!(args.common.mode(), BuildMode::Production);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["bask", "-v", "-q", "build"]).is_err());
    }

    #[test]
    fn plan_accepts_json_output() {
        let cli = Cli::try_parse_from(["bask", "plan", "--json"]).unwrap();
        let Command::Plan(args) = cli.command else {
            panic!("expected the plan command");
        };
        assert!(args.json);
    }
}
