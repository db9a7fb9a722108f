use std::collections::HashMap;

use testdriver_core::config_keys;
use testdriver_core::outcome::{ERROR_CATEGORIES, RUN_OUTCOMES, SCENARIO_OUTCOMES};
use testdriver_core::{ErrorCategory, RunOutcome, ScenarioOutcome};

#[test]
fn run_outcome_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, RunOutcome> = HashMap::new();
    for info in RUN_OUTCOMES {
        assert_eq!(RunOutcome::from_str(info.canonical), Some(info.id));
        assert_eq!(info.id.as_str(), info.canonical, "as_str mismatch for {:?}", info.id);
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!("duplicate outcome spelling {:?}: {:?} and {:?}", info.canonical, prev, info.id);
        }
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn scenario_and_category_spellings_resolvable() {
    for info in SCENARIO_OUTCOMES {
        assert_eq!(ScenarioOutcome::from_str(info.canonical), Some(info.id));
    }
    for info in ERROR_CATEGORIES {
        assert_eq!(ErrorCategory::from_str(info.canonical), Some(info.id));
        assert!(!info.description.is_empty());
    }
}

#[test]
fn config_key_spellings_unique() {
    let mut seen: HashMap<&'static str, config_keys::ConfigKeyId> = HashMap::new();
    for info in config_keys::CONFIG_KEYS {
        assert!(!info.spellings.is_empty(), "key {:?} has no spelling", info.id);
        for &spelling in info.spellings {
            assert_eq!(config_keys::from_str(spelling), Some(info.id));
            if let Some(prev) = seen.insert(spelling, info.id) {
                panic!("duplicate config key spelling {:?}: {:?} and {:?}", spelling, prev, info.id);
            }
        }
    }
}
