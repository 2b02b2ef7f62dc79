//! Callable skills.
//!
//! A [`SkillReference`] ties a validated manifest's [`HandlerBinding`] to a
//! contract file, a provisioning context and a [`HandlerResolver`]. Every
//! payload a handler sees and every response it returns passes through the
//! contract first.

mod harness;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::contract::{
    ContractLoader, DEFAULT_INCOMING, DEFAULT_OUTGOING, SchemaContractLoader, round_trip,
};
use crate::error::Result;
use crate::handler::{HandlerResolver, SkillContext};
use crate::manifest::HandlerBinding;

pub use harness::{SkillHarness, SkillOptions};

/// Lifecycle function run when the host starts a skill.
pub const ON_STARTED: &str = "on_started";
/// Lifecycle function run when the host stops a skill.
pub const ON_STOPPED: &str = "on_stopped";

/// A skill bound to its handler, contract and context.
#[derive(Clone)]
pub struct SkillReference {
    binding: HandlerBinding,
    context: SkillContext,
    handler_override: Option<String>,
    contract_path: PathBuf,
    resolver: Arc<dyn HandlerResolver>,
    loader: Arc<dyn ContractLoader>,
}

impl SkillReference {
    pub fn new(
        binding: HandlerBinding,
        contract_path: impl Into<PathBuf>,
        context: SkillContext,
        resolver: Arc<dyn HandlerResolver>,
    ) -> Self {
        Self {
            binding,
            context,
            handler_override: None,
            contract_path: contract_path.into(),
            resolver,
            loader: Arc::new(SchemaContractLoader),
        }
    }

    /// Load the handler from this path instead of the manifest's module.
    #[must_use]
    pub fn with_handler_override(mut self, path: Option<String>) -> Self {
        self.handler_override = path;
        self
    }

    #[must_use]
    pub fn with_contract_loader(mut self, loader: Arc<dyn ContractLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub const fn binding(&self) -> &HandlerBinding {
        &self.binding
    }

    #[must_use]
    pub const fn context(&self) -> &SkillContext {
        &self.context
    }

    #[must_use]
    pub fn contract_path(&self) -> &Path {
        &self.contract_path
    }

    #[must_use]
    pub fn handler_override(&self) -> Option<&str> {
        self.handler_override.as_deref()
    }

    /// Run the entry point on `payload`.
    ///
    /// The payload is round-tripped through the contract under `incoming`
    /// before the handler sees it, and the response under `outgoing` before
    /// it is returned. Empty namespace lists mean `["incoming"]` and
    /// `["outgoing"]`.
    ///
    /// The contract file is read and parsed on every call, so edits made
    /// between calls are picked up at the price of one load per evaluation.
    pub fn evaluate(&self, payload: &Value, incoming: &[String], outgoing: &[String]) -> Result<Value> {
        let incoming = namespaces_or(incoming, DEFAULT_INCOMING);
        let outgoing = namespaces_or(outgoing, DEFAULT_OUTGOING);
        let function = &self.binding.function;
        let module = &self.binding.module;

        let handler = self
            .resolver
            .resolve(function, module, self.handler_override.as_deref())?;
        let contract = self.loader.load(&self.contract_path)?;
        debug!(contract = %self.contract_path.display(), "contract loaded");

        let parsed = round_trip(contract.as_ref(), payload, &incoming)?;
        let raw = handler(Some(parsed), &self.context)?;
        let response = round_trip(contract.as_ref(), &raw, &outgoing)?;

        info!(function = %function, module = %module, "skill evaluated");
        Ok(response)
    }

    /// [`evaluate`](Self::evaluate) with the default namespaces.
    pub fn evaluate_default(&self, payload: &Value) -> Result<Value> {
        self.evaluate(payload, &[], &[])
    }

    pub fn on_started(&self) -> Result<()> {
        self.lifecycle(ON_STARTED)
    }

    pub fn on_stopped(&self) -> Result<()> {
        self.lifecycle(ON_STOPPED)
    }

    // Lifecycle hooks bypass the contract and their result is discarded.
    fn lifecycle(&self, function: &str) -> Result<()> {
        let handler =
            self.resolver
                .resolve(function, &self.binding.module, self.handler_override.as_deref())?;
        handler(None, &self.context)?;
        info!(function, module = %self.binding.module, "lifecycle hook ran");
        Ok(())
    }
}

impl std::fmt::Debug for SkillReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillReference")
            .field("binding", &self.binding)
            .field("context", &self.context)
            .field("handler_override", &self.handler_override)
            .field("contract_path", &self.contract_path)
            .finish_non_exhaustive()
    }
}

fn namespaces_or(namespaces: &[String], fallback: &str) -> Vec<String> {
    if namespaces.is_empty() {
        vec![fallback.to_string()]
    } else {
        namespaces.to_vec()
    }
}
