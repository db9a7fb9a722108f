//! The slot model: the only data that crosses an isolation boundary.
//!
//! Inbound (execute): test name, module path, configuration map, parameter map.
//! Inbound (list): module path.
//! Outbound (execute): scenario table, failure reason, outcome, error category, error detail.
//! Outbound (list): the catalog, when discovery succeeded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use testdriver_core::{ErrorCategory, RunOutcome};

use super::IsolationError;
use crate::StringMap;
use crate::catalog::TestArea;
use crate::pipeline::ExecutionRequest;
use crate::result::FlatExecution;

pub const TEST_FULL_NAME: &str = "test_full_name";
pub const MODULE_PATH: &str = "module_path";
pub const CONFIGS: &str = "configs";
pub const TEST_PARAMETERS: &str = "test_parameters";

pub const SCENARIOS: &str = "scenarios";
pub const FAILURE_REASON: &str = "failure_reason";
pub const OUTCOME: &str = "outcome";
pub const ERROR_CATEGORY: &str = "error_category";
pub const ERROR_DETAIL: &str = "error_detail";
pub const CATALOG: &str = "catalog";

/// Keys read back after an execute signal.
pub const EXECUTE_OUTBOUND: [&str; 5] = [SCENARIOS, FAILURE_REASON, OUTCOME, ERROR_CATEGORY, ERROR_DETAIL];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    Text(String),
    Map(StringMap),
    Table(Vec<[String; 4]>),
    Catalog(TestArea),
}

/// Named slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotMap {
    slots: BTreeMap<String, SlotValue>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: SlotValue) {
        self.slots.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&SlotValue> {
        self.slots.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SlotValue)> {
        self.slots.iter()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.slots.get(key) {
            Some(SlotValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn require_text(&self, key: &'static str) -> Result<&str, IsolationError> {
        self.text(key).ok_or(IsolationError::MissingSlot(key))
    }

    fn map_or_empty(&self, key: &str) -> StringMap {
        match self.slots.get(key) {
            Some(SlotValue::Map(map)) => map.clone(),
            _ => StringMap::new(),
        }
    }
}

impl FromIterator<(String, SlotValue)> for SlotMap {
    fn from_iter<I: IntoIterator<Item = (String, SlotValue)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// Inbound slots of an execute request.
pub fn execute_inbound(request: &ExecutionRequest) -> SlotMap {
    let mut slots = SlotMap::new();
    slots.set(TEST_FULL_NAME, SlotValue::Text(request.test_full_name.clone()));
    slots.set(MODULE_PATH, SlotValue::Text(request.module.display().to_string()));
    slots.set(CONFIGS, SlotValue::Map(request.configs.clone()));
    slots.set(TEST_PARAMETERS, SlotValue::Map(request.parameters.clone()));
    slots
}

pub fn request_from(slots: &SlotMap) -> Result<ExecutionRequest, IsolationError> {
    Ok(ExecutionRequest::new(slots.require_text(TEST_FULL_NAME)?, slots.require_text(MODULE_PATH)?)
        .with_configs(slots.map_or_empty(CONFIGS))
        .with_parameters(slots.map_or_empty(TEST_PARAMETERS)))
}

/// Outbound slots of a finished execution.
pub fn execution_outbound(flat: &FlatExecution) -> SlotMap {
    let mut slots = SlotMap::new();
    slots.set(SCENARIOS, SlotValue::Table(flat.scenarios.clone()));
    slots.set(FAILURE_REASON, SlotValue::Text(flat.failure_reason.clone()));
    slots.set(OUTCOME, SlotValue::Text(flat.outcome.as_str().to_string()));
    slots.set(ERROR_CATEGORY, SlotValue::Text(flat.error_category.as_str().to_string()));
    slots.set(ERROR_DETAIL, SlotValue::Text(flat.error_detail.clone()));
    slots
}

pub fn execution_from(slots: &SlotMap) -> Result<FlatExecution, IsolationError> {
    let outcome_text = slots.require_text(OUTCOME)?;
    let outcome = RunOutcome::from_str(outcome_text).ok_or_else(|| IsolationError::BadSlot {
        key: OUTCOME,
        value: outcome_text.to_string(),
    })?;
    let scenarios = match slots.get(SCENARIOS) {
        Some(SlotValue::Table(rows)) => rows.clone(),
        _ => Vec::new(),
    };
    Ok(FlatExecution {
        scenarios,
        failure_reason: slots.text(FAILURE_REASON).unwrap_or_default().to_string(),
        outcome,
        error_category: slots
            .text(ERROR_CATEGORY)
            .and_then(ErrorCategory::from_str)
            .unwrap_or_default(),
        error_detail: slots.text(ERROR_DETAIL).unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn request_survives_json() {
        let request = ExecutionRequest::new("Suite.Alpha.DoesMath", "mods/alpha")
            .config("__loglevel", "Error")
            .parameter("x", "4");
        let json = serde_json::to_string(&execute_inbound(&request)).unwrap();
        let back: SlotMap = serde_json::from_str(&json).unwrap();
        assert_eq!(request_from(&back).unwrap(), request);
    }

    #[test]
    fn missing_outcome_is_an_error() {
        let err = execution_from(&SlotMap::new()).unwrap_err();
        assert!(matches!(err, IsolationError::MissingSlot(OUTCOME)));
    }

    #[test]
    fn outcome_uses_stable_spelling() {
        let flat = FlatExecution::failed(RunOutcome::TestNotFound, "nope");
        let slots = execution_outbound(&flat);
        assert_eq!(slots.text(OUTCOME), Some("FailToFindTest"));
        assert_eq!(execution_from(&slots).unwrap(), flat);
    }
}
