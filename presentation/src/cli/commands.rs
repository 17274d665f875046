//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for the build summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    #[default]
    Text,
    /// JSON summary including placed cells
    Json,
}

/// A block coordinate written as `x,y,z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(format!("expected x,y,z but got '{s}'"));
        };
        let parse = |v: &str| {
            v.parse::<i32>()
                .map_err(|e| format!("invalid coordinate '{v}': {e}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
            z: parse(z)?,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Corners of a region given on the command line
#[derive(clap::Args, Debug, Clone)]
pub struct RegionArgs {
    /// First corner of the build region
    #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    pub from: Coordinate,

    /// Second corner of the build region
    #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    pub to: Coordinate,
}

/// Which demo structure to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    Cabin,
    Gate,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a plan with the configured webhook and build it
    Build {
        /// What to build
        prompt: String,

        #[command(flatten)]
        region: RegionArgs,

        /// First corner of an optional context region
        #[arg(long, value_name = "X,Y,Z", requires = "context_to", allow_hyphen_values = true)]
        context_from: Option<Coordinate>,

        /// Second corner of the context region
        #[arg(long, value_name = "X,Y,Z", requires = "context_from", allow_hyphen_values = true)]
        context_to: Option<Coordinate>,
    },

    /// Build a finished plan document fetched from an http(s) URL
    Import {
        /// URL of the plan document
        url: String,

        #[command(flatten)]
        region: RegionArgs,
    },

    /// Run an offline demo against a simulated generator
    Demo {
        #[arg(value_enum)]
        kind: DemoKind,
    },

    /// Show configuration sources and effective values
    Config,
}

/// CLI arguments for blueprint
#[derive(Parser, Debug)]
#[command(name = "blueprint")]
#[command(author, version, about = "Generate construction plans for a region and build them")]
#[command(long_about = r#"
Blueprint asks an external generator for a construction plan that fits a
selected region, validates it, and places it into a world a few blocks per
tick.

Configuration files are loaded from (in priority order):
1. BLUEPRINT_* environment variables (PLAN_WEBHOOK_URL for the webhook)
2. --config <path>     Explicit config file
3. ./blueprint.toml    Project-level config
4. ~/.config/blueprint/config.toml   Global config

Example:
  blueprint build --from 0,64,0 --to 7,64,7 "a small watchtower"
  blueprint import https://example.com/plan.json --from 0,64,0 --to 7,70,7
  blueprint demo cabin
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for the final summary
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress the drafting spinner
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(
            "10, -64,3".parse::<Coordinate>(),
            Ok(Coordinate { x: 10, y: -64, z: 3 })
        );
        assert!("1,2".parse::<Coordinate>().is_err());
        assert!("1,2,a".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_parse_build_command() {
        let cli = Cli::try_parse_from([
            "blueprint",
            "-vv",
            "build",
            "--from",
            "0,64,0",
            "--to",
            "-4,64,5",
            "a tower",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Build {
                prompt,
                region,
                context_from,
                ..
            } => {
                assert_eq!(prompt, "a tower");
                assert_eq!(region.to, Coordinate { x: -4, y: 64, z: 5 });
                assert!(context_from.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_context_corners_come_in_pairs() {
        let result = Cli::try_parse_from([
            "blueprint",
            "build",
            "--from",
            "0,0,0",
            "--to",
            "1,1,1",
            "--context-from",
            "0,0,0",
            "p",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_demo() {
        let cli = Cli::try_parse_from(["blueprint", "demo", "gate", "-o", "json"]).unwrap();
        assert!(matches!(cli.command, Command::Demo { kind: DemoKind::Gate }));
        assert_eq!(cli.output, OutputFormat::Json);
    }
}
