//! Device-bridge invocation (external `adb` binary) and device registry.
//!
//! AdbCommand  -> how to start the external tool (program + leading args)
//! AdbExecutor -> builds `<adb> [-s <device>] <subcommand> [args...]`,
//!                runs it, returns captured stdout or a fixed marker
//! Device / DeviceState -> parsed `devices -l` descriptors
//!
//! There is deliberately no timeout and no retry: the bridge surfaces
//! whatever the external tool reports, nothing more.

use crate::error::{Error, Result};
use anyhow::Context;
use serde::{Serialize, Serializer};
use shell_words::split as shell_split;
use std::fmt;
use tokio::process::Command;

/// Fixed marker returned for fire-and-forget commands that exited cleanly.
pub const SUCCESS_MARKER: &str = "command completed";

/* ---- External Tool Invocation ---- */

/// How to start the device-bridge binary. Usually just `adb`, but the
/// whole command line is overridable (e.g. `--adb "wsl adb"`).
#[derive(Debug, Clone)]
pub struct AdbCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for AdbCommand {
    fn default() -> Self {
        AdbCommand {
            program: "adb".to_string(),
            args: Vec::new(),
        }
    }
}

impl AdbCommand {
    /// Parse an override command line with shell-style splitting.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            anyhow::bail!("adb command override is empty");
        }
        let parts = shell_split(trimmed).context("failed to split adb command override")?;
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("no tokens in adb command override"))?;
        Ok(AdbCommand {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl fmt::Display for AdbCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.join(" "))
        }
    }
}

/* ---- Device Descriptors ---- */

/// Connection state token from the device listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// Listed as `device` - attached and authorized
    Online,
    Offline,
    Unauthorized,
    /// Any other token the tool may print (`bootloader`, `recovery`, ...)
    Other(String),
}

impl DeviceState {
    pub fn parse(token: &str) -> Self {
        match token {
            "device" => DeviceState::Online,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            other => DeviceState::Other(other.to_string()),
        }
    }

    /// The listing token this state came from.
    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Online => "device",
            DeviceState::Offline => "offline",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Other(s) => s,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, DeviceState::Online)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One row of the device listing. Immutable once parsed.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub id: String,
    #[serde(rename = "status")]
    pub state: DeviceState,
    pub model: String,
}

/// Parse long-form (`devices -l`) output into descriptors, in listing
/// order. Drops the header line, blank lines and the advisory `daemon`
/// lines the tool prints while starting its server.
pub fn parse_device_listing(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();
    for line in output.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() || line.contains("daemon") {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let (Some(id), Some(state)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let model = tokens
            .find_map(|t| t.strip_prefix("model:"))
            .unwrap_or("unknown")
            .to_string();
        devices.push(Device {
            id: id.to_string(),
            state: DeviceState::parse(state),
            model,
        });
    }
    devices
}

/* ---- Executor ---- */

/// Runs device-bridge commands, scoped to an explicitly held selected
/// device rather than any process-global state. Each front-end session
/// owns its own executor.
#[derive(Debug)]
pub struct AdbExecutor {
    command: AdbCommand,
    device: Option<String>,
}

impl AdbExecutor {
    pub fn new(command: AdbCommand) -> Self {
        AdbExecutor {
            command,
            device: None,
        }
    }

    /// Currently selected device id, if any.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Store a device id unconditionally (no existence check against the
    /// listing) and return the confirmation string.
    pub fn select_device(&mut self, id: &str) -> String {
        self.device = Some(id.to_string());
        format!("device set: {id}")
    }

    /// Full argv for one invocation: program args, selector flag when a
    /// device is held, then the operation arguments.
    fn assemble(&self, args: &[&str]) -> Vec<String> {
        let mut full = self.command.args.clone();
        if let Some(ref id) = self.device {
            full.push("-s".to_string());
            full.push(id.clone());
        }
        full.extend(args.iter().map(|a| a.to_string()));
        full
    }

    /// Run one external command to completion.
    ///
    /// `capture = true` returns trimmed stdout; `capture = false` returns
    /// [`SUCCESS_MARKER`]. A non-zero exit yields an error embedding the
    /// child's merged stdout+stderr diagnostic.
    pub async fn run(&self, args: &[&str], capture: bool) -> Result<String> {
        let argv = self.assemble(args);
        crate::log_debug!("exec: {} {}", self.command.program, argv.join(" "));
        let output = Command::new(&self.command.program)
            .args(&argv)
            .output()
            .await
            .map_err(|e| {
                Error::Invocation(format!("failed to run '{}': {e}", self.command.program))
            })?;

        if output.status.success() {
            if capture {
                Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                Ok(SUCCESS_MARKER.to_string())
            }
        } else {
            // Merge both streams so whatever the tool said survives intact.
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut diag = stdout.trim().to_string();
            if !stderr.trim().is_empty() {
                if !diag.is_empty() {
                    diag.push('\n');
                }
                diag.push_str(stderr.trim());
            }
            Err(Error::from_diagnostic(diag))
        }
    }

    /// Run a device shell command (`<adb> shell <args...>`).
    pub async fn shell(&self, args: &[&str], capture: bool) -> Result<String> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        self.run(&full, capture).await
    }

    /// Query the long-form device listing and parse it.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let output = self.run(&["devices", "-l"], true).await?;
        Ok(parse_device_listing(&output))
    }
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "List of devices attached\n\
        emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_x86_64 device:emu64x\n\
        \n\
        * daemon started successfully *\n\
        R58M123ABC     unauthorized usb:1-1\n\
        0a1b2c3d       offline\n";

    #[test]
    fn listing_parse_counts_and_order() {
        let devices = parse_device_listing(LISTING);
        assert_eq!(devices.len(), 3, "header/blank/daemon lines skipped");
        assert_eq!(devices[0].id, "emulator-5554");
        assert_eq!(devices[1].id, "R58M123ABC");
        assert_eq!(devices[2].id, "0a1b2c3d");
    }

    #[test]
    fn listing_parse_states_and_model() {
        let devices = parse_device_listing(LISTING);
        assert_eq!(devices[0].state, DeviceState::Online);
        assert_eq!(devices[0].model, "sdk_gphone64_x86_64");
        assert_eq!(devices[1].state, DeviceState::Unauthorized);
        assert_eq!(devices[1].model, "unknown", "missing model: token defaults");
        assert_eq!(devices[2].state, DeviceState::Offline);
    }

    #[test]
    fn listing_parse_header_only() {
        assert!(parse_device_listing("List of devices attached\n").is_empty());
    }

    #[test]
    fn state_round_trip() {
        assert_eq!(DeviceState::parse("device"), DeviceState::Online);
        assert!(DeviceState::parse("device").is_online());
        assert_eq!(DeviceState::parse("recovery").as_str(), "recovery");
    }

    #[test]
    fn device_serializes_status_token() {
        let d = Device {
            id: "x".into(),
            state: DeviceState::Online,
            model: "unknown".into(),
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["status"], "device");
    }

    #[test]
    fn command_override_parse_quoted() {
        let cmd = AdbCommand::parse(r#"wsl adb --some "a b""#).unwrap();
        assert_eq!(cmd.program, "wsl");
        assert_eq!(cmd.args, vec!["adb", "--some", "a b"]);
    }

    #[test]
    fn command_override_empty_rejected() {
        assert!(AdbCommand::parse("   ").is_err());
    }

    #[test]
    fn selector_flag_prefixes_arguments() {
        let mut ex = AdbExecutor::new(AdbCommand::default());
        ex.select_device("serial-1");
        let argv = ex.assemble(&["shell", "input", "tap", "1", "2"]);
        assert_eq!(argv, vec!["-s", "serial-1", "shell", "input", "tap", "1", "2"]);
    }

    #[test]
    fn no_selector_without_device() {
        let ex = AdbExecutor::new(AdbCommand::default());
        assert_eq!(ex.assemble(&["devices", "-l"]), vec!["devices", "-l"]);
    }

    #[cfg(unix)]
    fn sh_executor(script: &str) -> (AdbExecutor, Vec<String>) {
        let ex = AdbExecutor::new(AdbCommand {
            program: "sh".into(),
            args: vec!["-c".into()],
        });
        (ex, vec![script.to_string()])
    }

    #[cfg(unix)]
    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(fut)
    }

    #[test]
    #[cfg(unix)]
    fn run_captures_trimmed_stdout() {
        let (ex, script) = sh_executor("printf '  hi  \\n'");
        let out = block_on(ex.run(&[&script[0]], true)).unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    #[cfg(unix)]
    fn run_returns_marker_without_capture() {
        let (ex, script) = sh_executor("exit 0");
        let out = block_on(ex.run(&[&script[0]], false)).unwrap();
        assert_eq!(out, SUCCESS_MARKER);
    }

    #[test]
    #[cfg(unix)]
    fn run_embeds_child_diagnostics_on_failure() {
        let (ex, script) = sh_executor("echo oops >&2; exit 3");
        let err = block_on(ex.run(&[&script[0]], true)).unwrap_err();
        match err {
            Error::Invocation(msg) => assert!(msg.contains("oops"), "got: {msg}"),
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[test]
    fn spawn_failure_is_invocation_error() {
        let ex = AdbExecutor::new(AdbCommand {
            program: "phone-bridge-test-missing-binary".into(),
            args: Vec::new(),
        });
        let err = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(ex.run(&["devices"], true))
            .unwrap_err();
        assert!(matches!(err, Error::Invocation(_)));
    }

    #[test]
    fn select_device_is_unconditional() {
        let mut ex = AdbExecutor::new(AdbCommand::default());
        let msg = ex.select_device("not-listed-anywhere");
        assert_eq!(msg, "device set: not-listed-anywhere");
        assert_eq!(ex.device(), Some("not-listed-anywhere"));
    }
}
