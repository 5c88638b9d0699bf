//! CLI front end: one module per command family, each exposing clap
//! `Args` structs plus a single `execute_*` entry returning
//! `anyhow::Result<()>`.
//!
//! Convention: a logical operation failure is printed as text and the
//! process still exits 0 - the result string is the contract, not the
//! exit code. Only argument parsing and front-end setup errors are
//! non-zero.

pub mod apps;
pub mod check;
pub mod format;
pub mod phone;
pub mod screen;
pub mod serve;

pub use apps::{AppArgs, CloseAppArgs, OpenUrlArgs, execute_app, execute_close_app, execute_open_url};
pub use check::{CheckArgs, DeviceArgs, execute_check, execute_device};
pub use phone::{CallArgs, SendSmsArgs, execute_call, execute_hangup, execute_send_sms};
pub use screen::{
    KeyArgs, ScreenInteractArgs, ScreenshotArgs, SwipeArgs, TapArgs, TextArgs, execute_key,
    execute_screen_interact, execute_screenshot, execute_swipe, execute_tap, execute_text,
};
pub use serve::execute_serve;

use crate::adb::AdbExecutor;
use crate::error::Error;
use crate::tools;
use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Dispatch one cataloged operation on a fresh runtime. CLI entry points
/// are synchronous; the executor path is async.
pub(crate) fn invoke_blocking(
    executor: &mut AdbExecutor,
    name: &str,
    params: Map<String, Value>,
) -> Result<std::result::Result<Value, Error>> {
    let rt = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    Ok(rt.block_on(tools::invoke(executor, name, &params)))
}

/// Print an operation outcome to stdout. String results print verbatim,
/// structured results pretty-print, faults print as error text.
pub(crate) fn print_outcome(outcome: std::result::Result<Value, Error>) {
    match outcome {
        Ok(Value::String(s)) => println!("{s}"),
        Ok(v) => println!(
            "{}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
        ),
        Err(e) => {
            let style = format::Style::detect();
            println!(
                "{}{}",
                format::icon("error", &style),
                format::paint(format::Role::Error, format!("error: {e}"), &style)
            );
        }
    }
}

/// Invoke + print in one step, for the commands with no special output.
pub(crate) fn run_and_print(
    executor: &mut AdbExecutor,
    name: &str,
    params: Map<String, Value>,
) -> Result<()> {
    let outcome = invoke_blocking(executor, name, params)?;
    print_outcome(outcome);
    Ok(())
}

/// Shorthand for building the parameter map from literal pairs.
pub(crate) fn params(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
