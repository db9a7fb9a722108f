//! Module sources: how a module path becomes a [`ModuleDefinition`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::DriverError;
use crate::module::ModuleDefinition;

/// Loads the module found at a path.
pub trait ModuleSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<ModuleDefinition, DriverError>;
}

type ModuleFactory = Arc<dyn Fn() -> ModuleDefinition + Send + Sync>;

/// In-process table of modules keyed by path. Every load builds a fresh definition.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<PathBuf, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, path: impl Into<PathBuf>, factory: F) -> Self
    where
        F: Fn() -> ModuleDefinition + Send + Sync + 'static,
    {
        self.modules.insert(path.into(), Arc::new(factory));
        self
    }
}

impl ModuleSource for ModuleRegistry {
    fn load(&self, path: &Path) -> Result<ModuleDefinition, DriverError> {
        let factory = self
            .modules
            .get(path)
            .ok_or_else(|| DriverError::module_not_found(path.display().to_string(), "no module registered at this path"))?;
        Ok(factory())
    }
}

/// The module compiled into the running binary, served by [`crate::harness::serve`].
///
/// The requested path still has to exist so a stale or mistyped path reports `ModuleNotFound`.
#[derive(Clone, Copy)]
pub struct SelfModule {
    factory: fn() -> ModuleDefinition,
}

impl SelfModule {
    pub fn new(factory: fn() -> ModuleDefinition) -> Self {
        Self { factory }
    }
}

impl ModuleSource for SelfModule {
    fn load(&self, path: &Path) -> Result<ModuleDefinition, DriverError> {
        if !path.exists() {
            return Err(DriverError::module_not_found(
                path.display().to_string(),
                "module artifact does not exist",
            ));
        }
        Ok((self.factory)())
    }
}

/// Load a module and require at least one exported fixture.
pub fn load_checked(source: &dyn ModuleSource, path: &Path) -> Result<ModuleDefinition, DriverError> {
    let module = source.load(path)?;
    if module.exported().next().is_none() {
        return Err(DriverError::module_not_found(
            path.display().to_string(),
            "module exports no fixtures",
        ));
    }
    Ok(module)
}
