//! Module-binary side of the process boundary.
//!
//! A test module binary calls [`serve`] from `main`. With `--boundary <entry>` it reads inbound
//! slots as JSON from stdin, runs the entry against its own module definition and writes the
//! outbound slots as JSON to stdout. Without the flag it prints its test names, one per line.

use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;
use crate::isolation::slots::SlotMap;
use crate::isolation::{EntryPoint, run_entry};
use crate::module::ModuleDefinition;
use crate::module::loader::SelfModule;
use crate::version::DRIVER_VERSION;

#[derive(Parser, Debug)]
#[command(version = DRIVER_VERSION, about = "testdriver module harness")]
struct HarnessArgs {
    /// Serve one boundary signal over stdin/stdout.
    #[arg(long, value_enum)]
    boundary: Option<EntryPoint>,
}

#[derive(Debug, Error)]
enum HarnessError {
    #[error("cannot locate the running module: {0}")]
    CurrentExe(#[source] io::Error),

    #[error("boundary I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed boundary payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Run the harness for the module `definition` builds.
pub fn serve(definition: fn() -> ModuleDefinition) -> ExitCode {
    // stdout carries the boundary protocol; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = HarnessArgs::parse();
    let driver = Driver::new(Arc::new(SelfModule::new(definition)));

    let outcome = match args.boundary {
        Some(entry) => serve_boundary(entry, &driver),
        None => print_tests(&driver),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "harness failed");
            ExitCode::FAILURE
        }
    }
}

fn serve_boundary(entry: EntryPoint, driver: &Driver) -> Result<(), HarnessError> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let inbound: SlotMap = serde_json::from_str(&input)?;

    let outbound = run_entry(entry, &inbound, driver);

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &outbound)?;
    stdout.flush()?;
    Ok(())
}

fn print_tests(driver: &Driver) -> Result<(), HarnessError> {
    let exe = std::env::current_exe().map_err(HarnessError::CurrentExe)?;
    let mut stdout = io::stdout().lock();
    for entry in driver.flat_list(&exe).unwrap_or_default() {
        writeln!(stdout, "{}", entry.test_full_name)?;
    }
    Ok(())
}
