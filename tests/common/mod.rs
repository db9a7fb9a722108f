//! Shared in-process test module for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use testdriver::pipeline::invoke::invoke;
use testdriver::{
    CategoryMask, Driver, ErrorCategory, FixtureBuilder, Logger, ModuleDefinition, ModuleRegistry, TestFailure,
};

pub const MODULE: &str = "suite.mod";
pub const EMPTY_MODULE: &str = "empty.mod";
pub const MISSING_MODULE: &str = "missing.mod";

#[derive(Default)]
pub struct Alpha {
    ready: bool,
}

#[derive(Default)]
pub struct Plain;

pub fn suite() -> ModuleDefinition {
    ModuleDefinition::new("suite")
        .owner("module-owner")
        .config("env", "lab")
        .fixture(
            FixtureBuilder::<Alpha>::new("Suite.Alpha", "AlphaTests")
                .category(CategoryMask::TIER2)
                .setup("Setup", |f, _, _| {
                    f.ready = true;
                    Ok(())
                })
                .test_with(
                    "DoesMath",
                    |d| d.param::<i32>("x").owner("alice").config("timeout", "30"),
                    |f, ctx, args| {
                        let x = args.get::<i32>("x").ok_or("x was not bound")?;
                        ctx.verify("setup ran", f.ready);
                        ctx.verify("two plus two", x == 4);
                        ctx.counter("x", f64::from(x));
                        Ok(())
                    },
                )
                .test_with(
                    "Configured",
                    |d| d.config("env", "staging").config("timeout", "30"),
                    |_, ctx, _| {
                        ctx.log("configured");
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
            FixtureBuilder::<Plain>::new("Suite.Alpha", "Extra")
                .owner("fixture-owner")
                .config("timeout", "60")
                .test("Multi", |_, ctx, _| {
                    ctx.scenario("first step");
                    ctx.fail(TestFailure::new("first problem").with_category(ErrorCategory::Product));
                    ctx.scenario("second step");
                    ctx.fail(TestFailure::new("second problem").with_category(ErrorCategory::Test));
                    Ok(())
                })
                .build(),
        )
        .fixture(
            FixtureBuilder::<Plain>::new("Suite.Broken", "SetupFails")
                .setup("Setup", |_, _, _| {
                    Err(TestFailure::new("lab is offline")
                        .with_category(ErrorCategory::Environment)
                        .with_detail("ping timed out")
                        .into())
                })
                .test("Body", |_, ctx, _| {
                    ctx.log("body should not run");
                    Ok(())
                })
                .teardown("Teardown", |_, _, _| Err("teardown also failed".into()))
                .build(),
        )
        .fixture(
            FixtureBuilder::<Plain>::with_factory("Suite.Broken", "CantBuild", || Err("constructor refused".into()))
                .test("Anything", |_, _, _| Ok(()))
                .build(),
        )
        .fixture(
            FixtureBuilder::<Plain>::new("Suite.Panic", "Panicky")
                .test("Boom", |_, _, _| panic!("gamma exploded"))
                .test("Nested", |_, _, _| {
                    invoke::<()>("helper", || Err(TestFailure::new("deep cause").into()))?;
                    Ok(())
                })
                .build(),
        )
        .fixture(FixtureBuilder::<Plain>::new("Suite.Dup", "First").test("Same", |_, _, _| Ok(())).build())
        .fixture(FixtureBuilder::<Plain>::new("Suite.Dup", "Second").test("Same", |_, _, _| Ok(())).build())
        .fixture(FixtureBuilder::<Plain>::new("", "Rootless").test("Orphan", |_, _, _| Ok(())).build())
}

pub fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .register(MODULE, suite)
        .register(EMPTY_MODULE, || ModuleDefinition::new("empty"))
}

/// Driver over [`registry`] with a private logger so parallel tests do not share sinks.
pub fn driver() -> Driver {
    Driver::new(Arc::new(registry())).with_logger(Box::leak(Box::new(Logger::new())))
}
