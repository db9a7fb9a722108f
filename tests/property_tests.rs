//! Property-based tests for the driver
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs.

use proptest::prelude::*;

use testdriver::binder::{PassThrough, bind};
use testdriver::logging::memory::MemoryLog;
use testdriver::module::ParamDecl;
use testdriver::result::aggregate;
use testdriver::{CategoryMask, Metadata, ParamType, RunOutcome, ScenarioOutcome, ScenarioResult, StringMap};
use testdriver_core::MetadataChain;

fn scenario((failed, reason): (bool, String)) -> ScenarioResult {
    let mut s = ScenarioResult::new(format!("step {reason}"));
    if failed {
        s.outcome = ScenarioOutcome::Fail;
        s.failure_reason = reason;
    }
    s
}

fn param_type() -> impl Strategy<Value = ParamType> {
    prop_oneof![
        Just(ParamType::String),
        Just(ParamType::Int32),
        Just(ParamType::Decimal),
        Just(ParamType::Boolean),
        Just(ParamType::Enum {
            type_name: "Color".into(),
            members: vec!["Red".into()],
        }),
        Just(ParamType::unsupported("DateTime")),
    ]
}

proptest! {
    /// Property: the earliest failing scenario decides the reported reason.
    #[test]
    fn first_failure_wins(steps in prop::collection::vec((any::<bool>(), "[a-z]{1,8}"), 0..12)) {
        let expected = steps.iter().find(|(failed, _)| *failed).map(|(_, r)| r.clone());
        let result = aggregate(steps.into_iter().map(scenario).collect(), vec![], vec![]);
        match expected {
            Some(reason) => {
                prop_assert_eq!(result.outcome, RunOutcome::ExecutionError);
                prop_assert_eq!(result.failure_reason, reason);
            }
            None => prop_assert_eq!(result.outcome, RunOutcome::Pass),
        }
    }

    /// Property: binding yields one argument per declared parameter whatever is supplied.
    #[test]
    fn binding_preserves_arity(
        declared in prop::collection::vec(param_type(), 0..8),
        supplied in prop::collection::vec(any::<bool>(), 8),
    ) {
        let params: Vec<ParamDecl> = declared
            .into_iter()
            .enumerate()
            .map(|(i, ty)| ParamDecl { name: format!("p{i}"), ty })
            .collect();
        // Scalar values always coerce; enum values never match a member.
        let map: StringMap = params
            .iter()
            .zip(&supplied)
            .filter(|(_, given)| **given)
            .map(|(p, _)| {
                let value = match p.ty {
                    ParamType::Boolean => "true",
                    ParamType::Enum { .. } => "Blue",
                    _ => "7",
                };
                (p.name.clone(), value.to_string())
            })
            .collect();
        let args = bind(&params, &map, &PassThrough, &MemoryLog::default()).unwrap();
        prop_assert_eq!(args.len(), params.len());
    }

    /// Property: the none-tier marker is present exactly when a tier bit is.
    #[test]
    fn tier_marker_tracks_tier_bits(method in any::<u64>(), fixture in any::<u64>(), module in any::<u64>()) {
        let strip = |bits: u64| CategoryMask(bits & !CategoryMask::TIER_NONE.bits());
        let (m, f, d) = (
            Metadata::new().with_category(strip(method)),
            Metadata::new().with_category(strip(fixture)),
            Metadata::new().with_category(strip(module)),
        );
        let mask = MetadataChain::new(&m, &f, &d).category();
        prop_assert_eq!(mask.contains(CategoryMask::TIER_NONE), mask.has_tier());
    }
}
