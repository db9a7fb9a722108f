//! Outcome and error-category vocabulary.
//!
//! These spellings are stable identifiers consumed by upstream result reporting. Downstream code
//! resolves them through the registries here instead of comparing strings.

use std::fmt;

/// Metadata entry for one vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabInfo<Id: 'static> {
    pub id: Id,
    pub canonical: &'static str,
    pub description: &'static str,
}

/// Overall outcome of one execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunOutcome {
    #[default]
    Pass,
    ExecutionError,
    #[cfg_attr(feature = "serde", serde(rename = "FailToFindTest"))]
    TestNotFound,
    ModuleNotFound,
}

pub const RUN_OUTCOMES: &[VocabInfo<RunOutcome>] = &[
    VocabInfo {
        id: RunOutcome::Pass,
        canonical: "Pass",
        description: "Every scenario passed.",
    },
    VocabInfo {
        id: RunOutcome::ExecutionError,
        canonical: "ExecutionError",
        description: "A scenario failed, or the run failed outside any scenario.",
    },
    VocabInfo {
        id: RunOutcome::TestNotFound,
        canonical: "FailToFindTest",
        description: "No fixture method matches the requested full test name.",
    },
    VocabInfo {
        id: RunOutcome::ModuleNotFound,
        canonical: "ModuleNotFound",
        description: "The module is missing, unreadable, or declares no fixtures.",
    },
];

/// Outcome of one scenario (setup, test body, teardown or a sub-scenario).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScenarioOutcome {
    #[default]
    Pass,
    Fail,
}

pub const SCENARIO_OUTCOMES: &[VocabInfo<ScenarioOutcome>] = &[
    VocabInfo {
        id: ScenarioOutcome::Pass,
        canonical: "Pass",
        description: "The scenario completed without a recorded failure.",
    },
    VocabInfo {
        id: ScenarioOutcome::Fail,
        canonical: "Fail",
        description: "The scenario recorded at least one failure.",
    },
];

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCategory {
    /// Nobody has classified the failure yet. The pre-run default.
    #[default]
    Unresolved,
    Product,
    Test,
    Environment,
}

pub const ERROR_CATEGORIES: &[VocabInfo<ErrorCategory>] = &[
    VocabInfo {
        id: ErrorCategory::Unresolved,
        canonical: "Unresolved",
        description: "Not yet classified.",
    },
    VocabInfo {
        id: ErrorCategory::Product,
        canonical: "Product",
        description: "The system under test misbehaved.",
    },
    VocabInfo {
        id: ErrorCategory::Test,
        canonical: "Test",
        description: "The test code itself is wrong.",
    },
    VocabInfo {
        id: ErrorCategory::Environment,
        canonical: "Environment",
        description: "Infrastructure or configuration the test depends on is unavailable.",
    },
];

fn lookup<Id: Copy + PartialEq>(table: &'static [VocabInfo<Id>], id: Id) -> &'static str {
    table
        .iter()
        .find(|info| info.id == id)
        .map(|info| info.canonical)
        .unwrap_or("")
}

fn parse<Id: Copy>(table: &'static [VocabInfo<Id>], name: &str) -> Option<Id> {
    table.iter().find(|info| info.canonical == name).map(|info| info.id)
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        lookup(RUN_OUTCOMES, self)
    }

    pub fn from_str(name: &str) -> Option<Self> {
        parse(RUN_OUTCOMES, name)
    }

    pub fn is_pass(self) -> bool {
        self == RunOutcome::Pass
    }
}

impl ScenarioOutcome {
    pub fn as_str(self) -> &'static str {
        lookup(SCENARIO_OUTCOMES, self)
    }

    pub fn from_str(name: &str) -> Option<Self> {
        parse(SCENARIO_OUTCOMES, name)
    }

    pub fn is_failure(self) -> bool {
        self == ScenarioOutcome::Fail
    }
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        lookup(ERROR_CATEGORIES, self)
    }

    pub fn from_str(name: &str) -> Option<Self> {
        parse(ERROR_CATEGORIES, name)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
