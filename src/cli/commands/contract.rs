//! skilltest contract - Round-trip a payload through a contract

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, robot_ok};
use crate::contract::{SchemaContract, round_trip};
use crate::error::Result;

use super::read_payload;

#[derive(Args, Debug)]
pub struct ContractArgs {
    /// JSON payload; `-` reads stdin
    pub payload: String,

    /// Contract path (default: ../contract/contract.dbs)
    #[arg(long)]
    pub contract: Option<PathBuf>,

    /// Namespace path segment, repeatable (default: incoming)
    #[arg(long = "namespace")]
    pub namespaces: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &ContractArgs) -> Result<()> {
    let payload = read_payload(Some(&args.payload), None)?;
    let path = args
        .contract
        .clone()
        .unwrap_or_else(|| ctx.config.paths.contract.clone());
    let namespaces = if args.namespaces.is_empty() {
        ctx.config.namespaces.incoming.clone()
    } else {
        args.namespaces.clone()
    };

    let contract = SchemaContract::load(&path)?;
    let parsed = round_trip(&contract, &payload, &namespaces)?;

    if ctx.robot_mode {
        return emit_robot(
            &robot_ok(serde_json::json!({
                "contract": path.display().to_string(),
                "namespaces": namespaces,
                "parsed": parsed,
            })),
            ctx.output_format,
        );
    }
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
