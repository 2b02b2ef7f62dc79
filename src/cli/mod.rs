//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Validate a skill manifest and exercise its handler through the skill's data contract
#[derive(Parser, Debug)]
#[command(name = "skilltest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable machine-readable JSON output
    #[arg(long, short = 'm', global = true, visible_alias = "machine")]
    pub robot: bool,

    /// Output format (human, json, jsonl)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/skilltest/config.toml, then ./skilltest.toml)
    #[arg(long, global = true, env = "SKILLTEST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_args(self.robot, self.output_format)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a skill manifest
    Validate(commands::validate::ValidateArgs),

    /// Run the skill's entry point on a payload through its contract
    Evaluate(commands::evaluate::EvaluateArgs),

    /// Run the skill's on_started hook
    OnStarted(commands::lifecycle::LifecycleArgs),

    /// Run the skill's on_stopped hook
    OnStopped(commands::lifecycle::LifecycleArgs),

    /// Round-trip a payload through a contract without running a handler
    Contract(commands::contract::ContractArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn robot_flag_selects_json() {
        let cli = Cli::try_parse_from(["skilltest", "-m", "validate"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);

        let cli = Cli::try_parse_from(["skilltest", "validate", "-O", "jsonl"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Jsonl);
    }

    #[test]
    fn evaluate_collects_params_and_namespaces() {
        let cli = Cli::try_parse_from([
            "skilltest",
            "evaluate",
            r#"{"data":"x"}"#,
            "--param",
            "LANGUAGE=en",
            "--param",
            "MODE=a=b",
            "--incoming",
            "incoming",
            "--incoming",
            "v2",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(
            args.skill.params,
            vec![
                ("LANGUAGE".to_string(), "en".to_string()),
                ("MODE".to_string(), "a=b".to_string())
            ]
        );
        assert_eq!(args.incoming, vec!["incoming", "v2"]);
    }

    #[test]
    fn malformed_param_is_rejected() {
        assert!(Cli::try_parse_from(["skilltest", "on-started", "--param", "NOEQUALS"]).is_err());
    }
}
