//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::{HarnessError, Result};
use crate::skill::{SkillOptions, SkillReference};

pub mod contract;
pub mod evaluate;
pub mod lifecycle;
pub mod validate;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Evaluate(args) => evaluate::run(ctx, args),
        Commands::OnStarted(args) => lifecycle::run(ctx, args, lifecycle::Hook::Started),
        Commands::OnStopped(args) => lifecycle::run(ctx, args, lifecycle::Hook::Stopped),
        Commands::Contract(args) => contract::run(ctx, args),
    }
}

/// Options locating and provisioning a skill.
#[derive(Args, Debug, Clone, Default)]
pub struct SkillArgs {
    /// Manifest path (default: ../../skill.yml)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Contract path (default: ../contract/contract.dbs)
    #[arg(long)]
    pub contract: Option<PathBuf>,

    /// Load the handler from this file or directory instead of the manifest's module
    #[arg(long)]
    pub handler_path: Option<String>,

    /// Provisioning parameter, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

impl SkillArgs {
    pub fn options(&self) -> SkillOptions {
        SkillOptions {
            provision_parameters: self.params.iter().cloned().collect(),
            manifest_path: self.manifest.clone(),
            contract_path: self.contract.clone(),
            handler_path: self.handler_path.clone(),
        }
    }

    pub fn bind(&self, ctx: &AppContext) -> Result<SkillReference> {
        ctx.harness().get_skill(self.options())
    }
}

fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Payload from an inline argument, a file, or stdin (`-`).
pub(crate) fn read_payload(inline: Option<&str>, file: Option<&Path>) -> Result<Value> {
    let raw = match (inline, file) {
        (Some("-"), _) | (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
    };
    serde_json::from_str(&raw).map_err(|err| {
        HarnessError::ContractViolation(format!("payload is not valid JSON: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_param_splits_on_first_equals() {
        assert_eq!(parse_param("A=1").unwrap(), ("A".into(), "1".into()));
        assert_eq!(parse_param("URL=a=b").unwrap(), ("URL".into(), "a=b".into()));
        assert_eq!(parse_param("EMPTY=").unwrap(), ("EMPTY".into(), String::new()));
        assert!(parse_param("=1").is_err());
        assert!(parse_param("novalue").is_err());
    }

    #[test]
    fn read_payload_prefers_inline_then_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"data":"file"}"#).unwrap();

        let inline = read_payload(Some(r#"{"data":"inline"}"#), Some(&path)).unwrap();
        assert_eq!(inline["data"], "inline");
        let from_file = read_payload(None, Some(&path)).unwrap();
        assert_eq!(from_file["data"], "file");
    }

    #[test]
    fn read_payload_rejects_invalid_json() {
        let err = read_payload(Some("{not json"), None).unwrap_err();
        assert!(matches!(err, HarnessError::ContractViolation(ref m) if m.contains("not valid JSON")));
    }

    #[test]
    fn skill_args_build_options() {
        let args = SkillArgs {
            manifest: Some(PathBuf::from("skill.yml")),
            handler_path: Some("alt.sh".into()),
            params: vec![("LANGUAGE".into(), "en".into())],
            ..SkillArgs::default()
        };
        let options = args.options();
        assert_eq!(options.manifest_path, Some(PathBuf::from("skill.yml")));
        assert_eq!(options.contract_path, None);
        assert_eq!(options.handler_path.as_deref(), Some("alt.sh"));
        assert_eq!(options.provision_parameters["LANGUAGE"], "en");
    }
}
