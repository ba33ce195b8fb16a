//! MCP JSON-RPC 2.0 message handling
//!
//! Transport independent: the stdio and HTTP transports both hand each
//! decoded message to [`McpHandler::handle`] and write back whatever it
//! returns. Notifications (messages without an `id`) never get a reply.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::tools::{catalog, ToolDispatcher};

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "syncthing-mcp";

pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// JSON-RPC error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// One JSON-RPC message; the `id` member is read from the raw value
#[derive(Debug, Deserialize)]
struct Message {
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

fn response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Answers MCP requests with the tool dispatcher
#[derive(Debug, Clone)]
pub struct McpHandler {
    tools: ToolDispatcher,
}

impl McpHandler {
    pub fn new(tools: ToolDispatcher) -> Self {
        Self { tools }
    }

    /// Handles one raw message line
    ///
    /// Malformed JSON gets a parse error with a null id. Blank lines are
    /// ignored.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC message");
                Some(error_response(
                    Value::Null,
                    PARSE_ERROR,
                    &format!("Parse error: {e}"),
                ))
            }
        }
    }

    /// Handles one decoded message, returning the reply if one is due
    pub async fn handle(&self, message: Value) -> Option<Value> {
        let notification = is_notification(&message);
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        let message: Message = match serde_json::from_value(message) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Invalid JSON-RPC request");
                return Some(error_response(
                    id,
                    INVALID_REQUEST,
                    &format!("Invalid request: {e}"),
                ));
            }
        };

        debug!(method = %message.method, "Received");

        if notification {
            // Includes notifications/initialized
            return None;
        }

        let reply = match message.method.as_str() {
            "initialize" => response(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": SERVER_VERSION,
                    }
                }),
            ),
            "ping" => response(id, json!({})),
            "tools/list" => response(id, json!({ "tools": catalog::tool_definitions() })),
            "tools/call" => self.call_tool(id, message.params).await,
            other => error_response(id, METHOD_NOT_FOUND, &format!("Unknown method: {other}")),
        };
        Some(reply)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> Value {
        let params: CallParams = match serde_json::from_value(params.unwrap_or(Value::Null)) {
            Ok(p) => p,
            Err(e) => {
                return error_response(id, INVALID_PARAMS, &format!("Invalid params: {e}"));
            }
        };

        let output = self.tools.call(&params.name, params.arguments).await;
        response(
            id,
            json!({
                "content": [{ "type": "text", "text": output.text }],
                "isError": output.is_error,
            }),
        )
    }
}

/// Returns true if a message is a notification
///
/// Only a missing `id` member counts; `"id": null` is a request.
pub fn is_notification(message: &Value) -> bool {
    message.get("id").is_none()
}
