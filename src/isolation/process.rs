//! Child-process boundary.
//!
//! The module binary is spawned as `<module> --boundary <entry>` with the module's directory as
//! working directory. Inbound slots go in as one JSON document on stdin, outbound slots come back
//! as one JSON document on stdout. stderr is inherited for diagnostics.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::boundary::{Boundary, BoundaryFactory, SlotStore};
use super::slots::{MODULE_PATH, SlotValue};
use super::{EntryPoint, IsolationError};

/// Flag the module binary's harness recognises.
pub const BOUNDARY_FLAG: &str = "--boundary";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessBoundaryFactory;

impl BoundaryFactory for ProcessBoundaryFactory {
    fn create(&self, base_dir: &Path, name: &str) -> Result<Box<dyn Boundary>, IsolationError> {
        tracing::debug!(boundary = name, base_dir = %base_dir.display(), "creating process boundary");
        Ok(Box::new(ProcessBoundary {
            name: name.to_string(),
            base_dir: base_dir.to_path_buf(),
            store: SlotStore::default(),
            child: None,
        }))
    }
}

pub struct ProcessBoundary {
    name: String,
    base_dir: PathBuf,
    store: SlotStore,
    child: Option<Child>,
}

impl ProcessBoundary {
    fn spawn(&self, program: &Path, entry: EntryPoint) -> Result<Child, IsolationError> {
        Command::new(program)
            .arg(BOUNDARY_FLAG)
            .arg(entry.as_str())
            .current_dir(&self.base_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| IsolationError::Spawn {
                program: program.display().to_string(),
                source,
            })
    }

    /// Kill the previous child if it is still running and wait for it.
    fn reap(&mut self) -> Result<(), IsolationError> {
        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                child.kill()?;
                child.wait()?;
            }
        }
        Ok(())
    }
}

fn exchange(child: &mut Child, payload: &[u8]) -> Result<Vec<u8>, IsolationError> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(payload)?;
        // Dropping stdin closes it so the child sees end of input.
    }
    let mut output = Vec::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout.read_to_end(&mut output)?;
    }
    let status = child.wait()?;
    if !status.success() {
        return Err(IsolationError::Crashed(format!("boundary process exited with {status}")));
    }
    Ok(output)
}

impl Boundary for ProcessBoundary {
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
        self.reap()?;
        let module = self
            .store
            .slots
            .text(MODULE_PATH)
            .ok_or(IsolationError::MissingSlot(MODULE_PATH))?;
        // The child runs in another directory, so relative paths must be resolved here.
        let program = std::path::absolute(module)?;

        let mut inbound = self.store.slots.clone();
        inbound.set(MODULE_PATH, SlotValue::Text(program.display().to_string()));
        let payload = serde_json::to_vec(&inbound)?;

        let mut child = self.spawn(&program, entry)?;
        let exchanged = exchange(&mut child, &payload);
        self.child = Some(child);
        self.store.slots = serde_json::from_slice(&exchanged?)?;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), IsolationError> {
        tracing::debug!(boundary = %self.name, "tearing down process boundary");
        self.store.unload(&self.name)?;
        self.reap()
    }
}
