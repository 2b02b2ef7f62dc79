//! In-process handler registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{HandlerFn, HandlerResolver, SkillContext};
use crate::error::{HarnessError, Result};

/// Handlers registered as Rust closures, keyed by module identifier.
///
/// An override path, when given, is used as the module key instead of the
/// manifest's module. This mirrors loading the handler from another file.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    modules: HashMap<String, HashMap<String, HandlerFn>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point that receives the parsed payload.
    pub fn register_evaluate<F>(&mut self, module: &str, function: &str, handler: F) -> &mut Self
    where
        F: Fn(Value, &SkillContext) -> Result<Value> + Send + Sync + 'static,
    {
        let wrapped: HandlerFn = Arc::new(move |payload: Option<Value>, ctx: &SkillContext| {
            handler(payload.unwrap_or(Value::Null), ctx)
        });
        self.insert(module, function, wrapped)
    }

    /// Register a lifecycle function such as `on_started`.
    pub fn register_lifecycle<F>(&mut self, module: &str, function: &str, handler: F) -> &mut Self
    where
        F: Fn(&SkillContext) -> Result<()> + Send + Sync + 'static,
    {
        let wrapped: HandlerFn = Arc::new(move |_: Option<Value>, ctx: &SkillContext| {
            handler(ctx).map(|()| Value::Null)
        });
        self.insert(module, function, wrapped)
    }

    #[must_use]
    pub fn contains(&self, module: &str, function: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|functions| functions.contains_key(function))
    }

    fn insert(&mut self, module: &str, function: &str, handler: HandlerFn) -> &mut Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(function.to_string(), handler);
        self
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut modules: Vec<_> = self.modules.keys().collect();
        modules.sort();
        f.debug_struct("HandlerRegistry")
            .field("modules", &modules)
            .finish()
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve(
        &self,
        function: &str,
        module: &str,
        override_path: Option<&str>,
    ) -> Result<HandlerFn> {
        let key = override_path.unwrap_or(module);
        let handler = self
            .modules
            .get(key)
            .and_then(|functions| functions.get(function))
            .cloned()
            .ok_or_else(|| HarnessError::resolution(function, key))?;
        debug!(function, module = key, "resolved in-process handler");
        Ok(handler)
    }
}
