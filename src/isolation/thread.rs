//! In-process boundary: each signal runs on a dedicated thread over serialised slots.

use std::path::{Path, PathBuf};
use std::thread;

use super::boundary::{Boundary, BoundaryFactory, SlotStore};
use super::slots::{SlotMap, SlotValue};
use super::{EntryPoint, IsolationError, run_entry};
use crate::driver::Driver;
use crate::pipeline::invoke::PanicError;

/// Builds [`ThreadBoundary`]s that run a clone of `driver`.
#[derive(Clone)]
pub struct ThreadBoundaryFactory {
    driver: Driver,
}

impl ThreadBoundaryFactory {
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }
}

impl BoundaryFactory for ThreadBoundaryFactory {
    fn create(&self, base_dir: &Path, name: &str) -> Result<Box<dyn Boundary>, IsolationError> {
        tracing::debug!(boundary = name, base_dir = %base_dir.display(), "creating thread boundary");
        Ok(Box::new(ThreadBoundary {
            name: name.to_string(),
            base_dir: base_dir.to_path_buf(),
            driver: self.driver.clone(),
            store: SlotStore::default(),
        }))
    }
}

pub struct ThreadBoundary {
    name: String,
    base_dir: PathBuf,
    driver: Driver,
    store: SlotStore,
}

impl Boundary for ThreadBoundary {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn set_data(&mut self, key: &str, value: SlotValue) -> Result<(), IsolationError> {
        self.store.set(&self.name, key, value)
    }

    fn get_data(&self, key: &str) -> Result<Option<SlotValue>, IsolationError> {
        self.store.get(&self.name, key)
    }

    fn invoke(&mut self, entry: EntryPoint) -> Result<(), IsolationError> {
        self.store.ensure_live(&self.name)?;
        // Slots cross as text, never as shared references.
        let inbound = serde_json::to_string(&self.store.slots)?;
        let driver = self.driver.clone();

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || -> Result<String, serde_json::Error> {
                let slots: SlotMap = serde_json::from_str(&inbound)?;
                serde_json::to_string(&run_entry(entry, &slots, &driver))
            })?;

        let outbound = handle
            .join()
            .map_err(|payload| IsolationError::Crashed(PanicError::from_payload(payload).message))??;
        self.store.slots = serde_json::from_str(&outbound)?;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), IsolationError> {
        tracing::debug!(boundary = %self.name, "tearing down thread boundary");
        self.store.unload(&self.name)
    }
}
