//! Handlers implemented as executables.
//!
//! The module identifier names a file under the handler root (any extension
//! matches, `handler` finds `handler.py`). Each call runs
//! `[launcher...] <file> <function>` with:
//!
//! - the provisioning context exported as environment variables of the child
//! - a JSON [`HandlerRequest`] on stdin
//! - the JSON response read from stdout (empty stdout is `null`)
//!
//! Exit code [`RESOLUTION_EXIT_CODE`] tells the harness the function does
//! not exist in that file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{HandlerFn, HandlerResolver, SkillContext};
use crate::error::{HarnessError, Result};

/// Exit status a handler uses to report an unknown function.
pub const RESOLUTION_EXIT_CODE: i32 = 127;

/// Request document written to the handler's stdin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerRequest {
    pub function: String,
    pub payload: Option<Value>,
    pub context: SkillContext,
}

/// Resolves handlers to executables under a handler root.
///
/// Resolution only establishes that the module file exists. Whether the
/// file implements the function is learned when it runs and exits with
/// [`RESOLUTION_EXIT_CODE`], so for this backend an unknown function is
/// reported after the incoming payload has passed the contract, and an
/// invalid payload is reported as a contract violation first.
#[derive(Debug, Clone)]
pub struct ProcessResolver {
    handler_root: PathBuf,
    launcher: Vec<String>,
}

impl ProcessResolver {
    pub fn new(handler_root: impl Into<PathBuf>) -> Self {
        Self {
            handler_root: handler_root.into(),
            launcher: Vec::new(),
        }
    }

    /// Program (plus leading arguments) used to run handler files, e.g. `python3`.
    #[must_use]
    pub fn with_launcher(mut self, launcher: Vec<String>) -> Self {
        self.launcher = launcher;
        self
    }

    #[must_use]
    pub fn handler_root(&self) -> &Path {
        &self.handler_root
    }

    /// Find the file backing `module`.
    ///
    /// An override naming a file is used as-is; one naming a directory
    /// replaces the handler root.
    #[must_use]
    pub fn locate(&self, module: &str, override_path: Option<&str>) -> Option<PathBuf> {
        let base = match override_path.map(Path::new) {
            Some(path) if path.is_file() => return Some(path.to_path_buf()),
            Some(path) if path.is_dir() => path.to_path_buf(),
            Some(_) => return None,
            None => self.handler_root.clone(),
        };

        let direct = base.join(module);
        if direct.is_file() {
            return Some(direct);
        }
        let dir = direct.parent()?;
        let stem = direct.file_name()?;
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.file_stem() == Some(stem))
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }

    fn program(&self, function: &str, module: &str) -> Result<Option<(PathBuf, Vec<String>)>> {
        let Some((program, args)) = self.launcher.split_first() else {
            return Ok(None);
        };
        let resolved = which::which(program).map_err(|err| {
            warn!(launcher = %program, error = %err, "handler launcher not found");
            HarnessError::resolution(function, module)
        })?;
        Ok(Some((resolved, args.to_vec())))
    }
}

impl HandlerResolver for ProcessResolver {
    fn resolve(
        &self,
        function: &str,
        module: &str,
        override_path: Option<&str>,
    ) -> Result<HandlerFn> {
        let file = self.locate(module, override_path).ok_or_else(|| {
            debug!(module, root = %self.handler_root.display(), "handler module not found");
            HarnessError::resolution(function, module)
        })?;
        let invocation = Invocation {
            launcher: self.program(function, module)?,
            file,
            function: function.to_string(),
            module: module.to_string(),
        };
        debug!(function, file = %invocation.file.display(), "resolved process handler");
        Ok(Arc::new(move |payload: Option<Value>, ctx: &SkillContext| {
            invocation.call(payload, ctx)
        }))
    }
}

struct Invocation {
    launcher: Option<(PathBuf, Vec<String>)>,
    file: PathBuf,
    function: String,
    module: String,
}

impl Invocation {
    fn command(&self) -> Command {
        let mut cmd = match &self.launcher {
            Some((program, args)) => {
                let mut cmd = Command::new(program);
                cmd.args(args).arg(&self.file);
                cmd
            }
            None => Command::new(&self.file),
        };
        cmd.arg(&self.function);
        cmd
    }

    fn call(&self, payload: Option<Value>, ctx: &SkillContext) -> Result<Value> {
        let request = serde_json::to_vec(&HandlerRequest {
            function: self.function.clone(),
            payload,
            context: ctx.clone(),
        })?;

        let mut cmd = self.command();
        cmd.envs(ctx.iter())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|err| {
            warn!(file = %self.file.display(), error = %err, "failed to start handler");
            HarnessError::resolution(&self.function, &self.module)
        })?;
        // Written from its own thread so a handler that answers while still
        // reading cannot fill its stdout pipe and stall both sides.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || stdin.write_all(&request))
        });
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // Handlers that ignore their input may exit before reading it.
                Ok(Err(err)) if err.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => return Err(self.failed("stdin writer panicked".to_string())),
            }
        }

        match output.status.code() {
            Some(0) => {}
            Some(RESOLUTION_EXIT_CODE) => {
                return Err(HarnessError::resolution(&self.function, &self.module));
            }
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = match code {
                    Some(code) => format!("exit status {code}: {}", stderr.trim()),
                    None => format!("terminated by signal: {}", stderr.trim()),
                };
                return Err(self.failed(reason));
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(stdout)
            .map_err(|err| self.failed(format!("response is not valid JSON: {err}")))
    }

    fn failed(&self, reason: String) -> HarnessError {
        HarnessError::HandlerFailed {
            function: self.function.clone(),
            module: self.module.clone(),
            reason,
        }
    }
}
