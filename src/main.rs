use anyhow::Result;
use clap::{Parser, Subcommand};

mod adb;
mod cmd;
mod error;
mod rpc;
mod tools;
mod utils;

use adb::{AdbCommand, AdbExecutor};
use cmd::{
    AppArgs, CallArgs, CheckArgs, CloseAppArgs, DeviceArgs, KeyArgs, OpenUrlArgs,
    ScreenInteractArgs, ScreenshotArgs, SendSmsArgs, SwipeArgs, TapArgs, TextArgs,
};

/// phone-bridge - Android device control over the external adb binary
///
/// One subcommand per operation, plus `serve` which exposes the same
/// operation catalog as a request/response loop on stdin/stdout.
///
/// Global flags / env:
///   -v / -vv         Increase verbosity
///   -q / --quiet     Errors only
///   --adb CMDLINE    Device-bridge command line (or PHONE_ADB env)
///   -d / --device    Device id scoping this invocation
///
/// Examples:
///   phone-bridge check
///   phone-bridge app Maps
///   phone-bridge swipe 500 1500 500 300 --duration 200
///   phone-bridge screen-interact tap x=100 y=200
///   phone-bridge serve
#[derive(Parser, Debug)]
#[command(
    name = "phone-bridge",
    version,
    author,
    about = "Android device control bridge over adb",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Device-bridge command line (default `adb`; falls back to PHONE_ADB env)
    #[arg(long = "adb", global = true, value_name = "CMDLINE")]
    adb: Option<String>,

    /// Device id to scope this invocation to
    #[arg(short = 'd', long = "device", global = true, value_name = "SERIAL")]
    device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check device connectivity and list attached devices
    Check(CheckArgs),

    /// Select the device used by subsequent commands
    Device(DeviceArgs),

    /// Place a phone call
    Call(CallArgs),

    /// End the current call
    Hangup,

    /// Open the SMS composer with a recipient and message
    SendSms(SendSmsArgs),

    /// Launch an app by package name or name substring
    App(AppArgs),

    /// Force-stop an app
    CloseApp(CloseAppArgs),

    /// Tap the screen at a coordinate
    Tap(TapArgs),

    /// Swipe between two coordinates
    Swipe(SwipeArgs),

    /// Type literal text
    Text(TextArgs),

    /// Send a key event
    Key(KeyArgs),

    /// Capture a screenshot and pull it locally
    Screenshot(ScreenshotArgs),

    /// Open a URL in the default browser
    OpenUrl(OpenUrlArgs),

    /// Unified screen interaction (tap/swipe/text/key/find/wait/scroll)
    ScreenInteract(ScreenInteractArgs),

    /// Serve the operation catalog over stdin/stdout
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // Device-bridge command line: CLI flag > PHONE_ADB env > plain `adb`.
    let adb_override = cli.adb.clone().or_else(|| {
        std::env::var("PHONE_ADB")
            .ok()
            .filter(|s| !s.trim().is_empty())
    });
    let command = match adb_override {
        Some(raw) => match AdbCommand::parse(&raw) {
            Ok(cmd) => cmd,
            Err(e) => {
                crate::log_error!("invalid adb command line '{raw}': {e}");
                std::process::exit(2);
            }
        },
        None => AdbCommand::default(),
    };

    crate::log_debug!("device bridge: {command}");
    let mut executor = AdbExecutor::new(command);
    if let Some(ref device) = cli.device {
        executor.select_device(device);
    }

    match cli.command {
        Commands::Check(args) => cmd::execute_check(executor, args),
        Commands::Device(args) => cmd::execute_device(executor, args),
        Commands::Call(args) => cmd::execute_call(executor, args),
        Commands::Hangup => cmd::execute_hangup(executor),
        Commands::SendSms(args) => cmd::execute_send_sms(executor, args),
        Commands::App(args) => cmd::execute_app(executor, args),
        Commands::CloseApp(args) => cmd::execute_close_app(executor, args),
        Commands::Tap(args) => cmd::execute_tap(executor, args),
        Commands::Swipe(args) => cmd::execute_swipe(executor, args),
        Commands::Text(args) => cmd::execute_text(executor, args),
        Commands::Key(args) => cmd::execute_key(executor, args),
        Commands::Screenshot(args) => cmd::execute_screenshot(executor, args),
        Commands::OpenUrl(args) => cmd::execute_open_url(executor, args),
        Commands::ScreenInteract(args) => cmd::execute_screen_interact(executor, args),
        Commands::Serve => cmd::execute_serve(executor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_global_flags_anywhere() {
        let cli = Cli::try_parse_from(["phone-bridge", "tap", "1", "2", "-d", "emu-1", "-v"])
            .unwrap();
        assert_eq!(cli.device.as_deref(), Some("emu-1"));
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Tap(_)));
    }

    #[test]
    fn clap_parses_serve() {
        let cli = Cli::try_parse_from(["phone-bridge", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve));
    }

    #[test]
    fn clap_parses_adb_override() {
        let cli =
            Cli::try_parse_from(["phone-bridge", "--adb", "wsl adb", "check"]).unwrap();
        assert_eq!(cli.adb.as_deref(), Some("wsl adb"));
    }
}
