//! skilltest evaluate - Run a skill's entry point through its contract

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;

use super::{SkillArgs, read_payload};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// JSON payload; `-` or omitted reads stdin
    pub payload: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long, conflicts_with = "payload")]
    pub payload_file: Option<PathBuf>,

    #[command(flatten)]
    pub skill: SkillArgs,

    /// Incoming namespace path segment, repeatable (default: incoming)
    #[arg(long)]
    pub incoming: Vec<String>,

    /// Outgoing namespace path segment, repeatable (default: outgoing)
    #[arg(long)]
    pub outgoing: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &EvaluateArgs) -> Result<()> {
    let payload = read_payload(args.payload.as_deref(), args.payload_file.as_deref())?;
    let skill = args.skill.bind(ctx)?;

    let incoming = or_configured(&args.incoming, &ctx.config.namespaces.incoming);
    let outgoing = or_configured(&args.outgoing, &ctx.config.namespaces.outgoing);
    let response = skill.evaluate(&payload, incoming, outgoing)?;

    if ctx.robot_mode {
        return emit_robot(
            &robot_ok(serde_json::json!({
                "skill": skill.binding(),
                "incoming": incoming,
                "outgoing": outgoing,
                "response": response,
            })),
            ctx.output_format,
        );
    }

    if ctx.verbosity > 0 {
        let mut layout = HumanLayout::new();
        layout
            .section("Evaluation")
            .kv("Function", &skill.binding().function)
            .kv("Module", &skill.binding().module)
            .kv("Incoming", &incoming.join("."))
            .kv("Outgoing", &outgoing.join("."));
        emit_human(layout);
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn or_configured<'a>(explicit: &'a [String], configured: &'a [String]) -> &'a [String] {
    if explicit.is_empty() { configured } else { explicit }
}
