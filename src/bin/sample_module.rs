//! Sample test module binary.
//!
//! Run with: sample_module                      (prints its tests)
//!           sample_module --boundary execute   (serves one boundary signal)
//!
//! The integration tests drive it through the process boundary.

use std::process::ExitCode;

use testdriver::{
    CategoryMask, ErrorCategory, FixtureBuilder, ModuleDefinition, ParamEnum, TestFailure, harness,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ParamEnum)]
enum Currency {
    Usd,
    Eur,
}

#[derive(Default)]
struct Alpha {
    ready: bool,
}

#[derive(Default)]
struct Beta;

#[derive(Default)]
struct Gamma;

fn definition() -> ModuleDefinition {
    ModuleDefinition::new("sample_module")
        .owner("qa-team")
        .config("env", "lab")
        .fixture(
            FixtureBuilder::<Alpha>::new("Suite.Alpha", "AlphaTests")
                .category(CategoryMask::TIER1)
                .setup("Setup", |f, ctx, _| {
                    f.ready = true;
                    ctx.log("alpha ready");
                    Ok(())
                })
                .test_with(
                    "DoesMath",
                    |d| d.param::<i32>("x").owner("math-owner"),
                    |f, ctx, args| {
                        let x = args.get::<i32>("x").ok_or("x was not bound")?;
                        ctx.verify("setup ran", f.ready);
                        ctx.verify("two plus two", 2 + 2 == x);
                        ctx.counter("x", f64::from(x));
                        Ok(())
                    },
                )
                .test_with(
                    "Converts",
                    |d| d.param::<Currency>("currency").param::<f64>("amount"),
                    |_, ctx, args| {
                        let currency = args.get::<Currency>("currency").ok_or("unknown currency")?;
                        let amount = args.get::<f64>("amount").unwrap_or_default();
                        ctx.counter(currency.member(), amount);
                        Ok(())
                    },
                )
                .teardown("Teardown", |f, _, _| {
                    f.ready = false;
                    Ok(())
                })
                .build(),
        )
        .fixture(
            FixtureBuilder::<Beta>::new("Suite.Beta", "BetaTests")
                .setup("Setup", |_, _, _| {
                    Err(TestFailure::new("lab is offline")
                        .with_category(ErrorCategory::Environment)
                        .into())
                })
                .test("NeverRuns", |_, ctx, _| {
                    ctx.log("unreachable");
                    Ok(())
                })
                .teardown("Teardown", |_, _, _| Err("teardown also failed".into()))
                .build(),
        )
        .fixture(
            FixtureBuilder::<Gamma>::new("Suite.Gamma", "Panicky")
                .test("Panics", |_, _, _| panic!("gamma exploded"))
                .test("Twice", |_, _, _| Ok(()))
                .build(),
        )
        .fixture(
            FixtureBuilder::<Gamma>::new("Suite.Gamma", "Shadow")
                .test("Twice", |_, _, _| Ok(()))
                .build(),
        )
}

fn main() -> ExitCode {
    harness::serve(definition)
}
