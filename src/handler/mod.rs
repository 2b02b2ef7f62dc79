//! Handler resolution.
//!
//! A skill's code is located by `(function, module, override)` through a
//! [`HandlerResolver`]. Two backends ship with the crate:
//!
//! - [`HandlerRegistry`]: functions registered in-process, keyed by module
//! - [`ProcessResolver`]: executables on disk, driven over stdin/stdout

mod process;
mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use process::{HandlerRequest, ProcessResolver, RESOLUTION_EXIT_CODE};
pub use registry::HandlerRegistry;

/// Provisioning parameters handed to every handler call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillContext {
    params: BTreeMap<String, String>,
}

impl SkillContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<BTreeMap<String, String>> for SkillContext {
    fn from(params: BTreeMap<String, String>) -> Self {
        Self { params }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SkillContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A resolved entry point.
///
/// `evaluate` receives `Some(payload)`; lifecycle functions receive `None`
/// and their return value is discarded.
pub type HandlerFn = Arc<dyn Fn(Option<Value>, &SkillContext) -> Result<Value> + Send + Sync>;

/// Locate a handler function.
pub trait HandlerResolver: Send + Sync {
    /// Resolve `function` from `module`, or from `override_path` when given.
    ///
    /// Fails with [`HarnessError::Resolution`](crate::HarnessError::Resolution)
    /// when either the module or the function cannot be found.
    fn resolve(
        &self,
        function: &str,
        module: &str,
        override_path: Option<&str>,
    ) -> Result<HandlerFn>;
}
