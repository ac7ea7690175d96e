//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// COLMAP Runner - sparse reconstruction driver with optional image pre-scaling
#[derive(Parser, Debug)]
#[command(
    name = "colmap-runner",
    author,
    version,
    about = "Drive COLMAP sparse reconstruction over a workspace of images",
    long_about = "Runs database creation, feature extraction, feature matching and the \n\
                  mapper against a workspace directory, optionally shrinking the input \n\
                  images with ImageMagick first. Every command and its output is logged."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "COLMAP_RUNNER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "COLMAP_RUNNER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to configuration file (TOML or JSON); built-in defaults when absent
    #[arg(short, long, global = true, env = "COLMAP_RUNNER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pre-scale (optional) and reconstruct a workspace
    Run(RunArgs),

    /// Only pre-scale the images of a workspace
    Prescale(PrescaleArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display workspace status
    Info(InfoArgs),
}

/// Tool binary overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// COLMAP executable, overrides `tools.colmap`
    #[arg(long, env = "COLMAP_RUNNER_COLMAP")]
    pub colmap: Option<String>,

    /// ImageMagick convert executable, overrides `tools.convert`
    #[arg(long, env = "COLMAP_RUNNER_CONVERT")]
    pub convert: Option<String>,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Workspace directory containing `images/`
    pub workspace: PathBuf,

    /// Matching mode: exhaustive, sequential or spatial
    #[arg(short, long, env = "COLMAP_RUNNER_MATCHING")]
    pub matching: Option<String>,

    /// Scaling mode: none, half, quarter, eighth or longest_edge_1600
    #[arg(short, long, env = "COLMAP_RUNNER_SCALING")]
    pub scaling: Option<String>,

    /// Images already within 1600px: reencode, copy or omit
    #[arg(long, env = "COLMAP_RUNNER_UNSCALED_POLICY")]
    pub unscaled_policy: Option<String>,

    #[command(flatten)]
    pub tools: ToolArgs,

    /// Hold a lock file in the workspace for the whole run
    #[arg(long)]
    pub lock: bool,

    /// Print the commands that would run and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON instead of the plain log
    #[arg(long)]
    pub json: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "COLMAP_RUNNER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `prescale` command
#[derive(Args, Debug, Clone)]
pub struct PrescaleArgs {
    /// Workspace directory containing `images/`
    pub workspace: PathBuf,

    /// Scaling mode: none, half, quarter, eighth or longest_edge_1600
    #[arg(short, long, env = "COLMAP_RUNNER_SCALING")]
    pub scaling: Option<String>,

    /// Images already within 1600px: reencode, copy or omit
    #[arg(long, env = "COLMAP_RUNNER_UNSCALED_POLICY")]
    pub unscaled_policy: Option<String>,

    /// ImageMagick convert executable, overrides `tools.convert`
    #[arg(long, env = "COLMAP_RUNNER_CONVERT")]
    pub convert: Option<String>,

    /// Hold a lock file in the workspace while scaling
    #[arg(long)]
    pub lock: bool,

    /// Print the report as JSON instead of the plain log
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Workspace directory
    pub workspace: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "colmap-runner",
            "-v",
            "run",
            "/data/ws",
            "--matching",
            "spatial",
            "--scaling",
            "half",
            "--colmap",
            "/opt/colmap",
            "--lock",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.workspace, PathBuf::from("/data/ws"));
        assert_eq!(args.matching.as_deref(), Some("spatial"));
        assert_eq!(args.scaling.as_deref(), Some("half"));
        assert_eq!(args.tools.colmap.as_deref(), Some("/opt/colmap"));
        assert!(args.lock);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["colmap-runner", "-q", "-v", "validate"]);
        assert!(result.is_err());
    }
}
