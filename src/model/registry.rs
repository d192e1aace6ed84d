//! Name-keyed catalog of model constructors.
//!
//! Each model module contributes a `register` function that inserts its
//! constructor. [`ModelRegistry::with_builtin_models`] runs all of them in
//! one startup step; [`registry`] builds that catalog once per process and
//! hands out a shared, immutable reference afterwards.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::{hamming_weight, power, Model};
use crate::coefficients::Coefficients;
use crate::config::Config;
use crate::error::{LeakageError, Result};
use crate::execution::Execution;

/// Builds a model that borrows its collaborators for `'a`.
pub type ModelConstructor = for<'a> fn(
    &'a dyn Execution,
    &'a dyn Coefficients,
    &Config,
) -> Result<Box<dyn Model + 'a>>;

/// Catalog mapping model names to constructors.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    constructors: BTreeMap<&'static str, ModelConstructor>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry containing every model shipped with this crate.
    pub fn with_builtin_models() -> Result<Self> {
        let mut registry = Self::new();
        hamming_weight::register(&mut registry)?;
        power::register(&mut registry)?;
        Ok(registry)
    }

    /// Add a constructor under `name`.
    ///
    /// Names are unique; a second registration under the same name fails.
    pub fn register(&mut self, name: &'static str, constructor: ModelConstructor) -> Result<()> {
        if self.constructors.contains_key(name) {
            return Err(LeakageError::DuplicateModel { name });
        }
        tracing::debug!(model = name, "registered leakage model");
        self.constructors.insert(name, constructor);
        Ok(())
    }

    /// Build the model called `name` with default settings.
    pub fn create<'a>(
        &self,
        name: &str,
        execution: &'a dyn Execution,
        coefficients: &'a dyn Coefficients,
    ) -> Result<Box<dyn Model + 'a>> {
        self.create_with_config(name, execution, coefficients, &Config::default())
    }

    /// Build the model called `name` with explicit settings.
    pub fn create_with_config<'a>(
        &self,
        name: &str,
        execution: &'a dyn Execution,
        coefficients: &'a dyn Coefficients,
        config: &Config,
    ) -> Result<Box<dyn Model + 'a>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| LeakageError::UnknownModel {
                name: name.to_string(),
                available: self.names(),
            })?;
        constructor(execution, coefficients, config)
    }

    /// Whether a model is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }
}

/// The process-wide registry of built-in models.
///
/// Built on first use; concurrent first callers block until the single
/// initialization finishes.
pub fn registry() -> &'static ModelRegistry {
    static REGISTRY: OnceLock<ModelRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        ModelRegistry::with_builtin_models().expect("built-in model names are unique")
    })
}
