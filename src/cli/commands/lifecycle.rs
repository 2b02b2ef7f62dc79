//! skilltest on-started / on-stopped - Run a skill's lifecycle hooks

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::skill::{ON_STARTED, ON_STOPPED};

use super::SkillArgs;

#[derive(Args, Debug)]
pub struct LifecycleArgs {
    #[command(flatten)]
    pub skill: SkillArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Started,
    Stopped,
}

impl Hook {
    #[must_use]
    pub const fn function(self) -> &'static str {
        match self {
            Self::Started => ON_STARTED,
            Self::Stopped => ON_STOPPED,
        }
    }
}

pub fn run(ctx: &AppContext, args: &LifecycleArgs, hook: Hook) -> Result<()> {
    let skill = args.skill.bind(ctx)?;
    match hook {
        Hook::Started => skill.on_started()?,
        Hook::Stopped => skill.on_stopped()?,
    }

    if ctx.robot_mode {
        return emit_robot(
            &robot_ok(serde_json::json!({
                "hook": hook.function(),
                "module": skill.binding().module,
                "completed": true,
            })),
            ctx.output_format,
        );
    }

    let mut layout = HumanLayout::new();
    layout.push_line(format!(
        "{} {} completed ({})",
        style("✓").green(),
        hook.function(),
        skill.binding().module
    ));
    emit_human(layout);
    Ok(())
}
