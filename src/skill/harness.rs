//! Entry point that turns a skill directory into a [`SkillReference`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::SkillReference;
use crate::config::{Config, DEFAULT_CONTRACT_PATH, DEFAULT_MANIFEST_PATH};
use crate::contract::{ContractLoader, SchemaContractLoader};
use crate::error::Result;
use crate::handler::{HandlerResolver, ProcessResolver, SkillContext};
use crate::manifest;

/// Per-call options for [`SkillHarness::get_skill`].
#[derive(Debug, Clone, Default)]
pub struct SkillOptions {
    /// Values the host would inject at runtime; they become the [`SkillContext`].
    pub provision_parameters: BTreeMap<String, String>,
    pub manifest_path: Option<PathBuf>,
    pub contract_path: Option<PathBuf>,
    /// Handler location used instead of the manifest's module.
    pub handler_path: Option<String>,
}

impl SkillOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.provision_parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn contract(mut self, path: impl Into<PathBuf>) -> Self {
        self.contract_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn handler(mut self, path: impl Into<String>) -> Self {
        self.handler_path = Some(path.into());
        self
    }
}

/// Builds [`SkillReference`]s from manifests on disk.
#[derive(Clone)]
pub struct SkillHarness {
    manifest_path: PathBuf,
    contract_path: PathBuf,
    resolver: Arc<dyn HandlerResolver>,
    loader: Arc<dyn ContractLoader>,
}

impl SkillHarness {
    /// Harness with the conventional skill layout and the given resolver.
    pub fn new(resolver: Arc<dyn HandlerResolver>) -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            contract_path: PathBuf::from(DEFAULT_CONTRACT_PATH),
            resolver,
            loader: Arc::new(SchemaContractLoader),
        }
    }

    /// Harness configured from [`Config`], running handlers as processes.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let resolver = ProcessResolver::new(&config.paths.handler_root)
            .with_launcher(config.handler.launcher.clone());
        Self::new(Arc::new(resolver))
            .with_manifest_path(&config.paths.manifest)
            .with_contract_path(&config.paths.contract)
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn HandlerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_contract_loader(mut self, loader: Arc<dyn ContractLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    #[must_use]
    pub fn with_contract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.contract_path = path.into();
        self
    }

    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    #[must_use]
    pub fn contract_path(&self) -> &Path {
        &self.contract_path
    }

    /// Validate the manifest and bind the skill.
    ///
    /// Fails with the first manifest violation; nothing is bound from a
    /// partially valid manifest.
    pub fn get_skill(&self, options: SkillOptions) -> Result<SkillReference> {
        let manifest_path = options.manifest_path.unwrap_or_else(|| self.manifest_path.clone());
        let contract_path = options.contract_path.unwrap_or_else(|| self.contract_path.clone());

        let binding = manifest::validate_file(&manifest_path)?;
        let context = SkillContext::from(options.provision_parameters);
        debug!(
            manifest = %manifest_path.display(),
            contract = %contract_path.display(),
            params = context.len(),
            "skill bound"
        );

        Ok(SkillReference::new(binding, contract_path, context, Arc::clone(&self.resolver))
            .with_handler_override(options.handler_path)
            .with_contract_loader(Arc::clone(&self.loader)))
    }
}

impl std::fmt::Debug for SkillHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillHarness")
            .field("manifest_path", &self.manifest_path)
            .field("contract_path", &self.contract_path)
            .finish_non_exhaustive()
    }
}
