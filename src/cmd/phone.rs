//! Telephony subcommands: `call`, `hangup`, `send-sms`.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::adb::AdbExecutor;
use crate::cmd::{params, run_and_print};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Number to dial
    pub phone_number: String,
}

#[derive(Args, Debug)]
pub struct SendSmsArgs {
    /// Recipient number
    pub phone_number: String,
    /// Message body
    pub message: String,
}

pub fn execute_call(mut executor: AdbExecutor, args: CallArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "call",
        params(&[("phone_number", json!(args.phone_number))]),
    )
}

pub fn execute_hangup(mut executor: AdbExecutor) -> Result<()> {
    run_and_print(&mut executor, "hangup", Default::default())
}

pub fn execute_send_sms(mut executor: AdbExecutor, args: SendSmsArgs) -> Result<()> {
    run_and_print(
        &mut executor,
        "send_sms",
        params(&[
            ("phone_number", json!(args.phone_number)),
            ("message", json!(args.message)),
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
        SendSms(SendSmsArgs),
    }

    #[test]
    fn clap_parses_send_sms_positionals() {
        let cli = TestCli::try_parse_from(["t", "send-sms", "+15550100", "hello there"]).unwrap();
        match cli.cmd {
            TestSub::SendSms(a) => {
                assert_eq!(a.phone_number, "+15550100");
                assert_eq!(a.message, "hello there");
            }
        }
    }
}
