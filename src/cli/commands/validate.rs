//! skilltest validate - Check a skill manifest against every rule

use std::path::PathBuf;

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::manifest::{self, MANIFEST_RULES};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest path (default: ../../skill.yml)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// List the rules in evaluation order instead of validating
    #[arg(long)]
    pub rules: bool,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    if args.rules {
        return list_rules(ctx);
    }

    let path = args
        .manifest
        .clone()
        .unwrap_or_else(|| ctx.config.paths.manifest.clone());
    let binding = manifest::validate_file(&path)?;

    if ctx.robot_mode {
        return emit_robot(
            &robot_ok(serde_json::json!({
                "valid": true,
                "manifest": path.display().to_string(),
                "rules": MANIFEST_RULES.len(),
                "binding": binding,
            })),
            ctx.output_format,
        );
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&format!("{} Manifest is valid", style("✓").green()))
        .kv("Manifest", &path.display().to_string())
        .kv("Module", &binding.module)
        .kv("Function", &binding.function)
        .kv("Contract", &binding.contract)
        .kv("Rules", &MANIFEST_RULES.len().to_string());
    emit_human(layout);
    Ok(())
}

fn list_rules(ctx: &AppContext) -> Result<()> {
    if ctx.robot_mode {
        let rules: Vec<_> = MANIFEST_RULES
            .iter()
            .map(|rule| serde_json::json!({ "id": rule.id, "description": rule.description }))
            .collect();
        return emit_robot(&robot_ok(serde_json::json!({ "rules": rules })), ctx.output_format);
    }

    let mut layout = HumanLayout::new();
    layout.title("Manifest Rules");
    for (index, rule) in MANIFEST_RULES.iter().enumerate() {
        layout.push_line(format!(
            "{:>2}. {:<16} {}",
            index + 1,
            rule.id,
            style(rule.description).dim()
        ));
    }
    emit_human(layout);
    Ok(())
}
