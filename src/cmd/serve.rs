//! `serve` subcommand: run the stdio request/response loop.

use anyhow::Result;
use std::io;

use crate::adb::AdbExecutor;
use crate::log_info;
use crate::rpc::RpcServer;

/// Serve the operation catalog over stdin/stdout until EOF. The executor
/// (and with it the selected device) lives for the whole session.
pub fn execute_serve(executor: AdbExecutor) -> Result<()> {
    log_info!("serving on stdio (one request per line; EOF ends the session)");
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    RpcServer::new(executor).serve(stdin, stdout)
}
