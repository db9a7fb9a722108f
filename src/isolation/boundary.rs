//! The boundary contract and the slot store both implementations share.

use std::path::Path;

use super::slots::{SlotMap, SlotValue};
use super::{EntryPoint, IsolationError};

/// An isolated execution context reachable only through named slots and a zero-argument signal.
pub trait Boundary: Send {
    fn name(&self) -> &str;

    /// Directory the boundary is scoped to.
    fn base_dir(&self) -> &Path;

    fn set_data(&mut self, key: &str, value: SlotValue) -> Result<(), IsolationError>;

    fn get_data(&self, key: &str) -> Result<Option<SlotValue>, IsolationError>;

    /// Run `entry` inside the boundary against the current slots. Blocks until it completes.
    fn invoke(&mut self, entry: EntryPoint) -> Result<(), IsolationError>;

    /// Release the boundary. Every later call fails with [`IsolationError::Unloaded`].
    fn teardown(&mut self) -> Result<(), IsolationError>;
}

/// Creates boundaries scoped to a directory.
pub trait BoundaryFactory: Send + Sync {
    fn create(&self, base_dir: &Path, name: &str) -> Result<Box<dyn Boundary>, IsolationError>;
}

impl<F: BoundaryFactory + ?Sized> BoundaryFactory for &F {
    fn create(&self, base_dir: &Path, name: &str) -> Result<Box<dyn Boundary>, IsolationError> {
        (**self).create(base_dir, name)
    }
}

/// Slots plus the live/unloaded flag.
#[derive(Debug, Default)]
pub(crate) struct SlotStore {
    pub(crate) slots: SlotMap,
    unloaded: bool,
}

impl SlotStore {
    pub(crate) fn ensure_live(&self, name: &str) -> Result<(), IsolationError> {
        if self.unloaded {
            return Err(IsolationError::Unloaded { name: name.to_string() });
        }
        Ok(())
    }

    pub(crate) fn set(&mut self, name: &str, key: &str, value: SlotValue) -> Result<(), IsolationError> {
        self.ensure_live(name)?;
        self.slots.set(key, value);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str, key: &str) -> Result<Option<SlotValue>, IsolationError> {
        self.ensure_live(name)?;
        Ok(self.slots.get(key).cloned())
    }

    /// Mark unloaded and drop the slots. Fails if already unloaded.
    pub(crate) fn unload(&mut self, name: &str) -> Result<(), IsolationError> {
        self.ensure_live(name)?;
        self.unloaded = true;
        self.slots = SlotMap::new();
        Ok(())
    }
}
