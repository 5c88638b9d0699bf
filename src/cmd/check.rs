//! `check` and `device` subcommands: connectivity report and device
//! selection.

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::adb::AdbExecutor;
use crate::cmd::format::{Role, Style, icon, paint, table};
use crate::cmd::{invoke_blocking, params, print_outcome, run_and_print};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output the raw connectivity mapping as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Device id to scope subsequent commands to
    pub device_id: String,
}

/// Check device-bridge connectivity and list attached devices.
pub fn execute_check(mut executor: AdbExecutor, args: CheckArgs) -> Result<()> {
    let outcome = invoke_blocking(&mut executor, "check_connection", Default::default())?;

    let report = match outcome {
        Ok(v) => v,
        Err(e) => {
            print_outcome(Err(e));
            return Ok(());
        }
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
        );
        return Ok(());
    }

    let style = Style::detect();
    let devices = report["devices"].as_array().cloned().unwrap_or_default();
    if devices.is_empty() {
        println!(
            "{}{}",
            icon("phone", &style),
            paint(Role::Dim, "no devices found", &style)
        );
        return Ok(());
    }

    println!(
        "{}{}",
        icon("phone", &style),
        paint(
            Role::Success,
            format!("connected devices ({})", devices.len()),
            &style
        )
    );
    let rows: Vec<Vec<String>> = devices
        .iter()
        .map(|d| {
            vec![
                field(d, "id"),
                field(d, "status"),
                field(d, "model"),
            ]
        })
        .collect();
    print!("{}", table(&["ID", "STATUS", "MODEL"], &rows, &style));

    match report["current_device"].as_str() {
        Some(current) => println!("current device: {current}"),
        None => println!("current device: (none)"),
    }
    Ok(())
}

fn field(device: &Value, key: &str) -> String {
    device[key].as_str().unwrap_or("?").to_string()
}

/// Store the device id for this invocation and confirm.
pub fn execute_device(mut executor: AdbExecutor, args: DeviceArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "set_device",
        params(&[("device_id", json!(args.device_id))]),
    )
}
