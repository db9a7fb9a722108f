//! Driver version information.
//!
//! The run-start announcement and the boundary harness both report this value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.
//! - Prefer this constant over repeating `env!("CARGO_PKG_VERSION")` in multiple places.

/// The driver version string (for example, `0.1.0`).
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");
