use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::skill::SkillHarness;

/// Per-invocation state shared by all commands.
pub struct AppContext {
    /// Working directory; relative skill paths resolve against it.
    pub project_root: PathBuf,
    pub config: Config,
    pub robot_mode: bool,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;
        let output_format = cli.output_format();

        Ok(Self {
            project_root,
            config,
            robot_mode: output_format.is_machine_readable(),
            output_format,
            verbosity: cli.verbose,
        })
    }

    /// Harness for the configured skill layout, running handlers as processes.
    #[must_use]
    pub fn harness(&self) -> SkillHarness {
        SkillHarness::from_config(&self.config)
    }
}
