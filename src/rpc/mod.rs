//! Request/response front end over stdin/stdout.
//!
//! Newline-delimited JSON-RPC-shaped envelopes: `{method, params, id}` in,
//! `{result|error, id}` out, one per line, strictly in arrival order.
//! Methods: `initialize`, `list_tools`, `call_tool`. There is exactly one
//! implementation of this loop; it is the wire contract, not a fallback.
//!
//! Codes: -32700 parse error (id null), -32601 unknown method or tool,
//! -32602 invalid parameters, -32603 any other tool fault.

use crate::adb::AdbExecutor;
use crate::error::Error;
use crate::tools;
use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::io::{BufRead, Write};
use tokio::runtime::Runtime;

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Incoming envelope. Anything that fails to deserialize into this shape
/// is answered with a parse-error envelope and a null id.
#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    id: Value,
}

/// Serves the operation catalog over a line-oriented transport. Owns the
/// executor, so the selected device persists across requests within one
/// session and nowhere else.
pub struct RpcServer {
    executor: AdbExecutor,
}

impl RpcServer {
    pub fn new(executor: AdbExecutor) -> Self {
        RpcServer { executor }
    }

    /// Read requests until EOF, answering each on its own line. Blank
    /// lines are skipped. A long-running operation blocks the loop; that
    /// is the documented concurrency model.
    pub fn serve(&mut self, reader: impl BufRead, mut writer: impl Write) -> anyhow::Result<()> {
        let rt = Runtime::new().context("failed to create Tokio runtime")?;
        for line in reader.lines() {
            let line = line.context("failed to read request line")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let response = self.handle_line(&rt, line);
            serde_json::to_writer(&mut writer, &response)
                .context("failed to write response")?;
            writer.write_all(b"\n").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
        Ok(())
    }

    /// One request line in, one response value out.
    pub fn handle_line(&mut self, rt: &Runtime, line: &str) -> Value {
        let request: Request = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                return error_response(&Value::Null, PARSE_ERROR, format!("parse error: {e}"));
            }
        };
        self.handle_request(rt, request)
    }

    fn handle_request(&mut self, rt: &Runtime, request: Request) -> Value {
        let id = request.id;
        match request.method.as_deref() {
            Some("initialize") => result_response(
                &id,
                json!({"version": "1.0", "capabilities": ["tools"]}),
            ),
            Some("list_tools") => {
                let tools: Vec<Value> = tools::CATALOG
                    .iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.schema(),
                        })
                    })
                    .collect();
                result_response(&id, json!({"tools": tools}))
            }
            Some("call_tool") => self.call_tool(rt, &id, &request.params),
            Some(other) => error_response(
                &id,
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            ),
            None => error_response(&id, METHOD_NOT_FOUND, "missing method".to_string()),
        }
    }

    fn call_tool(&mut self, rt: &Runtime, id: &Value, params: &Value) -> Value {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return error_response(id, INVALID_PARAMS, "missing tool name".to_string());
        };
        let arguments: Map<String, Value> = match params.get("parameters") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return error_response(
                    id,
                    INVALID_PARAMS,
                    "tool parameters must be an object".to_string(),
                );
            }
        };
        match rt.block_on(tools::invoke(&mut self.executor, name, &arguments)) {
            Ok(result) => result_response(id, result),
            Err(e) => error_response(id, fault_code(&e), e.to_string()),
        }
    }
}

/// Map a tool fault onto a response code. Unknown tools share the unknown
/// method code; bad arguments get the invalid-params code; everything the
/// external tool reports stays an internal error with its text preserved.
fn fault_code(error: &Error) -> i64 {
    match error {
        Error::UnknownTool(_) => METHOD_NOT_FOUND,
        Error::BadArgs(_) => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    }
}

fn result_response(id: &Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "result": result, "id": id})
}

fn error_response(id: &Value, code: i64, message: String) -> Value {
    json!({"jsonrpc": "2.0", "error": {"code": code, "message": message}, "id": id})
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::AdbCommand;

    fn server() -> RpcServer {
        // Program that cannot exist; no test below should reach it.
        RpcServer::new(AdbExecutor::new(AdbCommand {
            program: "phone-bridge-test-missing-binary".into(),
            args: Vec::new(),
        }))
    }

    fn rt() -> Runtime {
        Runtime::new().unwrap()
    }

    #[test]
    fn malformed_line_yields_parse_error_null_id() {
        let resp = server().handle_line(&rt(), "{not json");
        assert_eq!(resp["error"]["code"], json!(PARSE_ERROR));
        assert_eq!(resp["id"], Value::Null);
    }

    #[test]
    fn unknown_method_yields_32601_with_id() {
        let resp = server().handle_line(&rt(), r#"{"method":"reboot_all","id":7}"#);
        assert_eq!(resp["error"]["code"], json!(METHOD_NOT_FOUND));
        assert_eq!(resp["id"], json!(7));
    }

    #[test]
    fn unknown_tool_yields_32601_with_id() {
        let resp = server().handle_line(
            &rt(),
            r#"{"method":"call_tool","params":{"name":"no_such_tool"},"id":"abc"}"#,
        );
        assert_eq!(resp["error"]["code"], json!(METHOD_NOT_FOUND));
        assert_eq!(resp["id"], json!("abc"));
    }

    #[test]
    fn initialize_shape() {
        let resp = server().handle_line(&rt(), r#"{"method":"initialize","id":1}"#);
        assert_eq!(resp["result"]["version"], json!("1.0"));
        assert_eq!(resp["result"]["capabilities"], json!(["tools"]));
        assert_eq!(resp["jsonrpc"], json!("2.0"));
    }

    #[test]
    fn list_tools_reflects_schemas() {
        let resp = server().handle_line(&rt(), r#"{"method":"list_tools","id":2}"#);
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), crate::tools::CATALOG.len());
        let swipe = tools
            .iter()
            .find(|t| t["name"] == json!("swipe"))
            .expect("swipe listed");
        assert!(
            swipe["parameters"]["required"]
                .as_array()
                .unwrap()
                .contains(&json!("x1")),
            "declared parameter schema must be reflected"
        );
    }

    #[test]
    fn bad_tool_args_yield_invalid_params() {
        let resp = server().handle_line(
            &rt(),
            r#"{"method":"call_tool","params":{"name":"screen_interact","parameters":{"action":"swipe","params":["x1=0","y1=0","x2=0"]}},"id":3}"#,
        );
        assert_eq!(resp["error"]["code"], json!(INVALID_PARAMS));
        assert_eq!(
            resp["error"]["message"],
            json!(crate::tools::INVALID_INTERACTION)
        );
    }

    #[test]
    fn unimplemented_action_is_internal_error() {
        let resp = server().handle_line(
            &rt(),
            r#"{"method":"call_tool","params":{"name":"screen_interact","parameters":{"action":"find","params":"method=text value=OK"}},"id":4}"#,
        );
        assert_eq!(resp["error"]["code"], json!(INTERNAL_ERROR));
        assert!(
            resp["error"]["message"]
                .as_str()
                .unwrap()
                .contains("unimplemented"),
        );
    }

    #[test]
    fn set_device_persists_within_session() {
        let mut srv = server();
        let rt = rt();
        let resp = srv.handle_line(
            &rt,
            r#"{"method":"call_tool","params":{"name":"set_device","parameters":{"device_id":"emu-1"}},"id":5}"#,
        );
        assert_eq!(resp["result"], json!("device set: emu-1"));
    }

    #[test]
    fn serve_loop_skips_blank_lines_and_answers_per_line() {
        let input = b"\n{\"method\":\"initialize\",\"id\":1}\nnot-json\n".to_vec();
        let mut out = Vec::new();
        server()
            .serve(std::io::Cursor::new(input), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2, "blank line produces no response");
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], json!(1));
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["error"]["code"], json!(PARSE_ERROR));
        assert_eq!(second["id"], Value::Null);
    }
}
