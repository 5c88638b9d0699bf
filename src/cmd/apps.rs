//! App and browser subcommands: `app`, `close-app`, `open-url`.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::adb::AdbExecutor;
use crate::cmd::{params, run_and_print};

#[derive(Args, Debug)]
pub struct AppArgs {
    /// Package name (contains a dot) or app name substring to look up
    pub app_name: String,
}

#[derive(Args, Debug)]
pub struct CloseAppArgs {
    /// Package to force-stop
    pub package_name: String,
}

#[derive(Args, Debug)]
pub struct OpenUrlArgs {
    /// URL to open; https:// is assumed when no scheme is given
    pub url: String,
}

pub fn execute_app(mut executor: AdbExecutor, args: AppArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "open_app",
        params(&[("app_name", json!(args.app_name))]),
    )
}

pub fn execute_close_app(mut executor: AdbExecutor, args: CloseAppArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "close_app",
        params(&[("package_name", json!(args.package_name))]),
    )
}

pub fn execute_open_url(mut executor: AdbExecutor, args: OpenUrlArgs) -> Result<()> {
    run_and_print(&mut executor, "open_url", params(&[("url", json!(args.url))]))
}
