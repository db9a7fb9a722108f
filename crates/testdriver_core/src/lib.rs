//! Provide the shared, pure vocabulary of the testdriver engine.
//!
//! This crate is intentionally small and dependency-light. It holds the pieces both the catalog
//! builder and the execution pipeline need to agree on:
//! - the category bitmask and its tier post-processing rule,
//! - metadata resolution across method, fixture and module levels,
//! - the stable outcome and error-category spellings reported upstream,
//! - the registry of recognized configuration keys.
//!
//! ## Notes
//!
//! - **No IO**, no global state. Everything here is deterministic.
//! - Enable the `serde` feature to make the data types serialisable.

pub mod category;
pub mod config_keys;
pub mod metadata;
pub mod outcome;

pub use category::CategoryMask;
pub use metadata::{AttributeKind, ConfigDecl, ConfigIdentity, MergeRule, Metadata, MetadataChain, Resolved};
pub use outcome::{ErrorCategory, RunOutcome, ScenarioOutcome};
