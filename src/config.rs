use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::contract::{DEFAULT_INCOMING, DEFAULT_OUTGOING};
use crate::error::{HarnessError, Result};

/// Manifest location relative to a skill's test directory.
pub const DEFAULT_MANIFEST_PATH: &str = "../../skill.yml";
/// Contract location relative to a skill's test directory.
pub const DEFAULT_CONTRACT_PATH: &str = "../contract/contract.dbs";
pub const DEFAULT_HANDLER_ROOT: &str = "src";

/// Project-level config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "skilltest.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub handler: HandlerConfig,
    #[serde(default)]
    pub namespaces: NamespacesConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path (or `SKILLTEST_CONFIG`) replaces the global and
    /// project files. Environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, project_root, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with a custom environment lookup.
    pub fn load_with_env<F>(explicit_path: Option<&Path>, project_root: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("SKILLTEST_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                HarnessError::Config(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(env);
        Ok(config)
    }

    /// `<config_dir>/skilltest/config.toml`, if a config directory exists.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skilltest/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| HarnessError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| HarnessError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.handler {
            self.handler.merge(patch);
        }
        if let Some(patch) = patch.namespaces {
            self.namespaces.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env_string(&env, "SKILLTEST_MANIFEST") {
            self.paths.manifest = PathBuf::from(value);
        }
        if let Some(value) = env_string(&env, "SKILLTEST_CONTRACT") {
            self.paths.contract = PathBuf::from(value);
        }
        if let Some(value) = env_string(&env, "SKILLTEST_HANDLER_ROOT") {
            self.paths.handler_root = PathBuf::from(value);
        }
        if let Some(value) = env_string(&env, "SKILLTEST_LAUNCHER") {
            self.handler.launcher = value.split_whitespace().map(str::to_string).collect();
        }
        if let Some(values) = env_list(&env, "SKILLTEST_INCOMING") {
            self.namespaces.incoming = values;
        }
        if let Some(values) = env_list(&env, "SKILLTEST_OUTGOING") {
            self.namespaces.outgoing = values;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub manifest: PathBuf,
    pub contract: PathBuf,
    pub handler_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST_PATH),
            contract: PathBuf::from(DEFAULT_CONTRACT_PATH),
            handler_root: PathBuf::from(DEFAULT_HANDLER_ROOT),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.manifest {
            self.manifest = value;
        }
        if let Some(value) = patch.contract {
            self.contract = value;
        }
        if let Some(value) = patch.handler_root {
            self.handler_root = value;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Program and leading arguments used to run handler files.
    /// Empty runs the handler file directly.
    #[serde(default)]
    pub launcher: Vec<String>,
}

impl HandlerConfig {
    fn merge(&mut self, patch: HandlerPatch) {
        if let Some(value) = patch.launcher {
            self.launcher = value;
        }
    }
}

/// Default namespace paths for `evaluate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacesConfig {
    pub incoming: Vec<String>,
    pub outgoing: Vec<String>,
}

impl Default for NamespacesConfig {
    fn default() -> Self {
        Self {
            incoming: vec![DEFAULT_INCOMING.to_string()],
            outgoing: vec![DEFAULT_OUTGOING.to_string()],
        }
    }
}

impl NamespacesConfig {
    // Namespace lists are paths, so a patch replaces rather than extends.
    fn merge(&mut self, patch: NamespacesPatch) {
        if let Some(values) = patch.incoming {
            self.incoming = values;
        }
        if let Some(values) = patch.outgoing {
            self.outgoing = values;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub handler: Option<HandlerPatch>,
    pub namespaces: Option<NamespacesPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsPatch {
    pub manifest: Option<PathBuf>,
    pub contract: Option<PathBuf>,
    pub handler_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HandlerPatch {
    pub launcher: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamespacesPatch {
    pub incoming: Option<Vec<String>>,
    pub outgoing: Option<Vec<String>>,
}

fn env_string<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(key).filter(|value| !value.trim().is_empty())
}

fn env_list<F>(env: &F, key: &str) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    env_string(env, key).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
}
