//! Screen input subcommands: `tap`, `swipe`, `text`, `key`, `screenshot`
//! and the unified `screen-interact` front.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::{Value, json};
use std::fmt;

use crate::adb::AdbExecutor;
use crate::cmd::{params, run_and_print};

#[derive(Args, Debug)]
pub struct TapArgs {
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
}

#[derive(Args, Debug)]
pub struct SwipeArgs {
    /// Start X
    pub x1: i64,
    /// Start Y
    pub y1: i64,
    /// End X
    pub x2: i64,
    /// End Y
    pub y2: i64,
    /// Swipe duration in milliseconds
    #[arg(long, default_value_t = 300)]
    pub duration: i64,
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to type, passed to the device literally
    pub text: String,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Keycode such as KEYCODE_HOME
    pub keycode: String,
}

#[derive(Args, Debug)]
pub struct ScreenshotArgs {
    /// Local destination path
    #[arg(long, default_value = "screenshot.png")]
    pub output: String,

    /// Device-side capture path
    #[arg(long, value_name = "DEVICE_PATH", default_value = "/sdcard/screenshot.png")]
    pub remote: String,
}

/// Actions understood by the unified interaction front.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractAction {
    Tap,
    Swipe,
    Text,
    Key,
    Find,
    Wait,
    Scroll,
}

impl fmt::Display for InteractAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractAction::Tap => "tap",
            InteractAction::Swipe => "swipe",
            InteractAction::Text => "text",
            InteractAction::Key => "key",
            InteractAction::Find => "find",
            InteractAction::Wait => "wait",
            InteractAction::Scroll => "scroll",
        };
        f.write_str(s)
    }
}

#[derive(Args, Debug)]
pub struct ScreenInteractArgs {
    /// Interaction action
    pub action: InteractAction,

    /// Parameters as key=value tokens (e.g. x=100 y=200)
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

pub fn execute_tap(mut executor: AdbExecutor, args: TapArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "tap",
        params(&[("x", json!(args.x)), ("y", json!(args.y))]),
    )
}

pub fn execute_swipe(mut executor: AdbExecutor, args: SwipeArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "swipe",
        params(&[
            ("x1", json!(args.x1)),
            ("y1", json!(args.y1)),
            ("x2", json!(args.x2)),
            ("y2", json!(args.y2)),
            ("duration", json!(args.duration)),
        ]),
    )
}

pub fn execute_text(mut executor: AdbExecutor, args: TextArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "input_text",
        params(&[("text", json!(args.text))]),
    )
}

pub fn execute_key(mut executor: AdbExecutor, args: KeyArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "press_key",
        params(&[("keycode", json!(args.keycode))]),
    )
}

pub fn execute_screenshot(mut executor: AdbExecutor, args: ScreenshotArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "take_screenshot",
        params(&[
            ("output_path", json!(args.remote)),
            ("local_path", json!(args.output)),
        ]),
    )
}

pub fn execute_screen_interact(
    mut executor: AdbExecutor,
    args: ScreenInteractArgs,
) -> Result<()> {
    let tokens: Vec<Value> = args.params.iter().map(|t| json!(t)).collect();
    run_and_print(
        &mut executor,
        "screen_interact",
        params(&[
            ("action", json!(args.action.to_string())),
            ("params", Value::Array(tokens)),
        ]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Tap(TapArgs),
        Swipe(SwipeArgs),
        Screenshot(ScreenshotArgs),
        ScreenInteract(ScreenInteractArgs),
    }

    #[test]
    fn clap_parses_tap_coordinates() {
        let cli = TestCli::try_parse_from(["t", "tap", "120", "640"]).unwrap();
        match cli.cmd {
            TestSub::Tap(a) => {
                assert_eq!((a.x, a.y), (120, 640));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn clap_swipe_duration_defaults() {
        let cli = TestCli::try_parse_from(["t", "swipe", "0", "0", "0", "800"]).unwrap();
        match cli.cmd {
            TestSub::Swipe(a) => assert_eq!(a.duration, 300),
            other => panic!("unexpected: {other:?}"),
        }
        let cli =
            TestCli::try_parse_from(["t", "swipe", "0", "0", "0", "800", "--duration", "150"])
                .unwrap();
        match cli.cmd {
            TestSub::Swipe(a) => assert_eq!(a.duration, 150),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn clap_screenshot_defaults() {
        let cli = TestCli::try_parse_from(["t", "screenshot"]).unwrap();
        match cli.cmd {
            TestSub::Screenshot(a) => {
                assert_eq!(a.output, "screenshot.png");
                assert_eq!(a.remote, "/sdcard/screenshot.png");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn clap_interact_collects_kv_tokens() {
        let cli =
            TestCli::try_parse_from(["t", "screen-interact", "swipe", "x1=0", "y1=0", "x2=0"])
                .unwrap();
        match cli.cmd {
            TestSub::ScreenInteract(a) => {
                assert_eq!(a.action, InteractAction::Swipe);
                assert_eq!(a.params, vec!["x1=0", "y1=0", "x2=0"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn clap_rejects_unknown_action() {
        assert!(TestCli::try_parse_from(["t", "screen-interact", "pinch"]).is_err());
    }
}
