//! Operation catalog and dispatcher.
//!
//! Every operation is an argument-formatting rule over [`AdbExecutor`]:
//! the catalog maps a tool name to a declared parameter schema and a
//! handler, and both front ends (CLI subcommands, stdio request loop)
//! dispatch through [`invoke`]. The table is static and built at compile
//! time, so `list_tools` can reflect real parameter schemas.

use crate::adb::AdbExecutor;
use crate::error::{Error, Result};
use serde_json::{Map, Value, json};

/// Fixed message for a `screen_interact` call whose required keys are
/// missing. Returned without touching the external tool.
pub const INVALID_INTERACTION: &str = "invalid screen interaction parameters";

const DEFAULT_REMOTE_SCREENSHOT: &str = "/sdcard/screenshot.png";
const DEFAULT_LOCAL_SCREENSHOT: &str = "screenshot.png";

/* ---- Catalog ---- */

/// Primitive parameter types the catalog declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Raw default, rendered into the schema according to `kind`.
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl ParamSpec {
    const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        ParamSpec {
            name,
            kind,
            required: true,
            default: None,
            description,
        }
    }

    const fn optional(
        name: &'static str,
        kind: ParamKind,
        default: &'static str,
        description: &'static str,
    ) -> Self {
        ParamSpec {
            name,
            kind,
            required: false,
            default: Some(default),
            description,
        }
    }
}

/// One named operation exposed through both front ends.
#[derive(Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolSpec {
    /// JSON object schema (`properties` / `required`) for this tool.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(p.kind.as_str()));
            prop.insert("description".into(), json!(p.description));
            if let Some(raw) = p.default {
                let default = match p.kind {
                    ParamKind::Integer => raw
                        .parse::<i64>()
                        .map(|n| json!(n))
                        .unwrap_or_else(|_| json!(raw)),
                    ParamKind::Boolean => json!(raw.eq_ignore_ascii_case("true")),
                    ParamKind::String => json!(raw),
                };
                prop.insert("default".into(), default);
            }
            if p.required {
                required.push(json!(p.name));
            }
            properties.insert(p.name.to_string(), Value::Object(prop));
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// The full operation catalog, in the order both front ends present it.
pub const CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "check_connection",
        description: "Check device-bridge connectivity and list attached devices",
        params: &[],
    },
    ToolSpec {
        name: "set_device",
        description: "Select the device that scopes subsequent commands",
        params: &[ParamSpec::required(
            "device_id",
            ParamKind::String,
            "device id from the listing",
        )],
    },
    ToolSpec {
        name: "call",
        description: "Place a phone call",
        params: &[ParamSpec::required(
            "phone_number",
            ParamKind::String,
            "number to dial",
        )],
    },
    ToolSpec {
        name: "hangup",
        description: "End the current call",
        params: &[],
    },
    ToolSpec {
        name: "send_sms",
        description: "Open the SMS composer pre-filled with a recipient and message",
        params: &[
            ParamSpec::required("phone_number", ParamKind::String, "recipient number"),
            ParamSpec::required("message", ParamKind::String, "message body"),
        ],
    },
    ToolSpec {
        name: "open_app",
        description: "Launch an app by package name or by name substring lookup",
        params: &[ParamSpec::required(
            "app_name",
            ParamKind::String,
            "package name (contains a dot) or name substring",
        )],
    },
    ToolSpec {
        name: "close_app",
        description: "Force-stop an app",
        params: &[ParamSpec::required(
            "package_name",
            ParamKind::String,
            "package to stop",
        )],
    },
    ToolSpec {
        name: "tap",
        description: "Tap the screen at a coordinate",
        params: &[
            ParamSpec::required("x", ParamKind::Integer, "x coordinate"),
            ParamSpec::required("y", ParamKind::Integer, "y coordinate"),
        ],
    },
    ToolSpec {
        name: "swipe",
        description: "Swipe between two coordinates",
        params: &[
            ParamSpec::required("x1", ParamKind::Integer, "start x"),
            ParamSpec::required("y1", ParamKind::Integer, "start y"),
            ParamSpec::required("x2", ParamKind::Integer, "end x"),
            ParamSpec::required("y2", ParamKind::Integer, "end y"),
            ParamSpec::optional("duration", ParamKind::Integer, "300", "duration in ms"),
        ],
    },
    ToolSpec {
        name: "input_text",
        description: "Type literal text into the focused field",
        params: &[ParamSpec::required(
            "text",
            ParamKind::String,
            "text to type",
        )],
    },
    ToolSpec {
        name: "press_key",
        description: "Send a key event",
        params: &[ParamSpec::required(
            "keycode",
            ParamKind::String,
            "keycode such as KEYCODE_HOME",
        )],
    },
    ToolSpec {
        name: "take_screenshot",
        description: "Capture the screen on the device and pull the image locally",
        params: &[
            ParamSpec::optional(
                "output_path",
                ParamKind::String,
                DEFAULT_REMOTE_SCREENSHOT,
                "device-side capture path",
            ),
            ParamSpec::optional(
                "local_path",
                ParamKind::String,
                DEFAULT_LOCAL_SCREENSHOT,
                "local destination path",
            ),
        ],
    },
    ToolSpec {
        name: "open_url",
        description: "Open a URL in the device's default browser",
        params: &[ParamSpec::required(
            "url",
            ParamKind::String,
            "URL; https:// is assumed when no scheme is given",
        )],
    },
    ToolSpec {
        name: "screen_interact",
        description: "Unified screen interaction (tap/swipe/text/key/find/wait/scroll)",
        params: &[
            ParamSpec::required(
                "action",
                ParamKind::String,
                "one of tap, swipe, text, key, find, wait, scroll",
            ),
            ParamSpec {
                name: "params",
                kind: ParamKind::String,
                required: false,
                default: None,
                description: "key=value pairs, space separated or as an array",
            },
        ],
    },
];

/// Look a tool up by name.
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|t| t.name == name)
}

/* ---- Dispatch ---- */

/// Invoke a cataloged operation with named parameters. This is the single
/// dispatcher both front ends go through.
pub async fn invoke(
    executor: &mut AdbExecutor,
    name: &str,
    params: &Map<String, Value>,
) -> Result<Value> {
    match name {
        "check_connection" => check_connection(executor).await,
        "set_device" => {
            let id = string_param(params, "device_id")?;
            Ok(json!(executor.select_device(&id)))
        }
        "call" => {
            let number = string_param(params, "phone_number")?;
            let uri = format!("tel:{number}");
            let out = executor
                .shell(
                    &["am", "start", "-a", "android.intent.action.CALL", "-d", &uri],
                    false,
                )
                .await?;
            Ok(json!(out))
        }
        "hangup" => {
            let out = executor
                .shell(&["input", "keyevent", "KEYCODE_ENDCALL"], false)
                .await?;
            Ok(json!(out))
        }
        "send_sms" => {
            let number = string_param(params, "phone_number")?;
            let message = string_param(params, "message")?;
            let uri = format!("smsto:{number}");
            let out = executor
                .shell(
                    &[
                        "am",
                        "start",
                        "-a",
                        "android.intent.action.SENDTO",
                        "-d",
                        &uri,
                        "--es",
                        "sms_body",
                        &message,
                    ],
                    false,
                )
                .await?;
            Ok(json!(out))
        }
        "open_app" => {
            let app_name = string_param(params, "app_name")?;
            open_app(executor, &app_name).await
        }
        "close_app" => {
            let package = string_param(params, "package_name")?;
            let out = executor
                .shell(&["am", "force-stop", &package], false)
                .await?;
            Ok(json!(out))
        }
        "tap" => {
            let x = int_param(params, "x")?;
            let y = int_param(params, "y")?;
            tap(executor, &x.to_string(), &y.to_string()).await
        }
        "swipe" => {
            let x1 = int_param(params, "x1")?.to_string();
            let y1 = int_param(params, "y1")?.to_string();
            let x2 = int_param(params, "x2")?.to_string();
            let y2 = int_param(params, "y2")?.to_string();
            let duration = opt_int_param(params, "duration", 300)?.to_string();
            swipe(executor, &x1, &y1, &x2, &y2, &duration).await
        }
        "input_text" => {
            let text = string_param(params, "text")?;
            input_text(executor, &text).await
        }
        "press_key" => {
            let keycode = string_param(params, "keycode")?;
            press_key(executor, &keycode).await
        }
        "take_screenshot" => {
            let remote = opt_string_param(params, "output_path", DEFAULT_REMOTE_SCREENSHOT)?;
            let local = opt_string_param(params, "local_path", DEFAULT_LOCAL_SCREENSHOT)?;
            executor.shell(&["screencap", "-p", &remote], false).await?;
            executor.run(&["pull", &remote, &local], false).await?;
            Ok(json!(format!("screenshot saved to: {local}")))
        }
        "open_url" => {
            let url = string_param(params, "url")?;
            let target = normalize_url(&url);
            let out = executor
                .shell(
                    &[
                        "am",
                        "start",
                        "-a",
                        "android.intent.action.VIEW",
                        "-d",
                        &target,
                    ],
                    false,
                )
                .await?;
            Ok(json!(out))
        }
        "screen_interact" => {
            let action = string_param(params, "action")?;
            let tokens = interact_tokens(params)?;
            let kv = parse_kv_params(&tokens);
            screen_interact(executor, &action, &kv).await
        }
        other => {
            // Catalog and dispatch table must not drift apart.
            debug_assert!(
                find_tool(other).is_none(),
                "cataloged tool '{other}' has no dispatch arm"
            );
            Err(Error::UnknownTool(other.to_string()))
        }
    }
}

/* ---- Operation Bodies ---- */

async fn check_connection(executor: &mut AdbExecutor) -> Result<Value> {
    let devices = executor.list_devices().await?;
    // Auto-select the first online device when none is held yet.
    if executor.device().is_none()
        && let Some(first) = devices.iter().find(|d| d.state.is_online())
    {
        let id = first.id.clone();
        executor.select_device(&id);
    }
    Ok(json!({
        "connected": !devices.is_empty(),
        "devices": devices,
        "current_device": executor.device(),
    }))
}

async fn open_app(executor: &AdbExecutor, app_name: &str) -> Result<Value> {
    // A dotted name is taken as a package name and launched directly,
    // skipping the package-list query.
    if app_name.contains('.') {
        return launch_package(executor, app_name).await;
    }
    let listing = executor
        .shell(&["pm", "list", "packages", app_name], true)
        .await?;
    match first_package(&listing) {
        Some(package) => launch_package(executor, &package).await,
        None => Ok(json!(format!("app not found: {app_name}"))),
    }
}

async fn launch_package(executor: &AdbExecutor, package: &str) -> Result<Value> {
    let out = executor
        .shell(
            &[
                "monkey",
                "-p",
                package,
                "-c",
                "android.intent.category.LAUNCHER",
                "1",
            ],
            false,
        )
        .await?;
    Ok(json!(out))
}

/// First `package:`-prefixed line of a `pm list packages` query, or None
/// when the output does not start with the marker.
fn first_package(listing: &str) -> Option<String> {
    listing
        .lines()
        .next()?
        .trim()
        .strip_prefix("package:")
        .map(|p| p.trim().to_string())
}

async fn tap(executor: &AdbExecutor, x: &str, y: &str) -> Result<Value> {
    let out = executor.shell(&["input", "tap", x, y], false).await?;
    Ok(json!(out))
}

async fn swipe(
    executor: &AdbExecutor,
    x1: &str,
    y1: &str,
    x2: &str,
    y2: &str,
    duration: &str,
) -> Result<Value> {
    let out = executor
        .shell(&["input", "swipe", x1, y1, x2, y2, duration], false)
        .await?;
    Ok(json!(out))
}

async fn input_text(executor: &AdbExecutor, text: &str) -> Result<Value> {
    // Text goes through literally; the external tool's own quoting rules
    // apply, so spaces are the caller's problem.
    let out = executor.shell(&["input", "text", text], false).await?;
    Ok(json!(out))
}

async fn press_key(executor: &AdbExecutor, keycode: &str) -> Result<Value> {
    let out = executor
        .shell(&["input", "keyevent", keycode], false)
        .await?;
    Ok(json!(out))
}

/// Ensure the URL carries a scheme the VIEW intent can resolve.
fn normalize_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url)
        && matches!(parsed.scheme(), "http" | "https")
    {
        return url.to_string();
    }
    format!("https://{url}")
}

/* ---- screen_interact ---- */

/// Tokens for the free-form parameter list: either an array of strings or
/// a single whitespace-separated string.
fn interact_tokens(params: &Map<String, Value>) -> Result<Vec<String>> {
    match params.get("params") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Some(Value::Array(items)) => Ok(items.iter().map(render_scalar).collect()),
        Some(_) => Err(Error::BadArgs(
            "parameter 'params' must be a string or an array of key=value strings".into(),
        )),
    }
}

/// Split `key=value` tokens on the first `=` and coerce each value:
/// all-digit strings become integers, case-insensitive true/false become
/// booleans, everything else stays a string. Tokens without `=` are
/// silently dropped.
pub fn parse_kv_params(tokens: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    for token in tokens {
        if let Some((key, value)) = token.split_once('=') {
            out.insert(key.to_string(), coerce_scalar(value));
        }
    }
    out
}

fn coerce_scalar(raw: &str) -> Value {
    if !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && let Ok(n) = raw.parse::<i64>()
    {
        return json!(n);
    }
    if raw.eq_ignore_ascii_case("true") {
        return json!(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return json!(false);
    }
    json!(raw)
}

/// Render a coerced value back into a single command-line argument.
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn screen_interact(
    executor: &AdbExecutor,
    action: &str,
    kv: &Map<String, Value>,
) -> Result<Value> {
    let get = |key: &str| kv.get(key).map(render_scalar);
    match action {
        "tap" => {
            if let (Some(x), Some(y)) = (get("x"), get("y")) {
                return tap(executor, &x, &y).await;
            }
            // Element-locator taps would need a UI-tree dump; not built.
            if kv.contains_key("element_text") || kv.contains_key("element_content_desc") {
                return Err(Error::Unimplemented("tap by element locator"));
            }
            Err(Error::BadArgs(INVALID_INTERACTION.into()))
        }
        "swipe" => {
            match (get("x1"), get("y1"), get("x2"), get("y2")) {
                (Some(x1), Some(y1), Some(x2), Some(y2)) => {
                    let duration = get("duration").unwrap_or_else(|| "300".to_string());
                    swipe(executor, &x1, &y1, &x2, &y2, &duration).await
                }
                _ => Err(Error::BadArgs(INVALID_INTERACTION.into())),
            }
        }
        "text" => match get("content") {
            Some(content) => input_text(executor, &content).await,
            None => Err(Error::BadArgs(INVALID_INTERACTION.into())),
        },
        "key" => match get("keycode") {
            Some(keycode) => press_key(executor, &keycode).await,
            None => Err(Error::BadArgs(INVALID_INTERACTION.into())),
        },
        "find" | "wait" | "scroll" => {
            if kv.contains_key("method") && kv.contains_key("value") {
                Err(Error::Unimplemented(match action {
                    "find" => "find element",
                    "wait" => "wait for element",
                    _ => "scroll to element",
                }))
            } else {
                Err(Error::BadArgs(INVALID_INTERACTION.into()))
            }
        }
        _ => Err(Error::BadArgs(INVALID_INTERACTION.into())),
    }
}

/* ---- Parameter Extraction ---- */

fn string_param(params: &Map<String, Value>, key: &str) -> Result<String> {
    match params.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(Error::BadArgs(format!("parameter '{key}' must be a scalar"))),
        None => Err(Error::BadArgs(format!("missing required parameter: {key}"))),
    }
}

fn opt_string_param(params: &Map<String, Value>, key: &str, default: &str) -> Result<String> {
    if params.contains_key(key) {
        string_param(params, key)
    } else {
        Ok(default.to_string())
    }
}

fn int_param(params: &Map<String, Value>, key: &str) -> Result<i64> {
    match params.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| Error::BadArgs(format!("parameter '{key}' must be an integer"))),
        Some(Value::String(s)) => s
            .parse::<i64>()
            .map_err(|_| Error::BadArgs(format!("parameter '{key}' must be an integer"))),
        Some(_) => Err(Error::BadArgs(format!(
            "parameter '{key}' must be an integer"
        ))),
        None => Err(Error::BadArgs(format!("missing required parameter: {key}"))),
    }
}

fn opt_int_param(params: &Map<String, Value>, key: &str, default: i64) -> Result<i64> {
    if params.contains_key(key) {
        int_param(params, key)
    } else {
        Ok(default)
    }
}

/* ---- Tests ---- */
