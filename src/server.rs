//! Tool-protocol adapter: JSON-RPC 2.0 over line-delimited stdio
//!
//! Exposes a single `calculate` tool. Requests are handled one at a time
//! against one interpreter, so variables persist for the whole session.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value as Json, json};

use crate::interp::{Interpreter, Limits};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "tally";
pub const TOOL_NAME: &str = "calculate";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// Incoming JSON-RPC message
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications; an explicit `null` is still a request
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Json>,
    pub method: String,
    #[serde(default)]
    pub params: Json,
}

/// Outgoing JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Json>, D::Error> {
    Json::deserialize(deserializer).map(Some)
}

impl Response {
    fn ok(id: Json, result: Json) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Json, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: CalculateArgs,
}

#[derive(Debug, Default, Deserialize)]
struct CalculateArgs {
    expression: Option<String>,
}

/// Session state for the tool server
#[derive(Debug, Default)]
pub struct ToolServer {
    interp: Interpreter,
}

impl ToolServer {
    pub fn new(limits: Limits) -> Self {
        Self {
            interp: Interpreter::with_limits(limits),
        }
    }

    /// Serve requests from `input` until it closes
    pub fn serve(&mut self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        tracing::info!("tool server listening on stdio");
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line) {
                let text = serde_json::to_string(&response).map_err(io::Error::other)?;
                writeln!(output, "{}", text)?;
                output.flush()?;
            }
        }
        tracing::info!("tool server input closed");
        Ok(())
    }

    /// Handle one raw line; `None` for notifications
    pub fn handle_message(&mut self, line: &str) -> Option<Response> {
        let raw: Json = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("unparsable message: {}", e);
                return Some(Response::err(
                    Json::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = raw.get("id").cloned().unwrap_or(Json::Null);
        match serde_json::from_value::<Request>(raw) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                tracing::warn!("invalid request: {}", e);
                Some(Response::err(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        }
    }

    pub fn handle_request(&mut self, request: Request) -> Option<Response> {
        if request.jsonrpc != "2.0" {
            tracing::warn!("unsupported jsonrpc version {:?}", request.jsonrpc);
            return Some(Response::err(
                request.id.unwrap_or(Json::Null),
                INVALID_REQUEST,
                format!("Invalid request: unsupported jsonrpc version {:?}", request.jsonrpc),
            ));
        }

        let Some(id) = request.id else {
            tracing::debug!("notification {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => Response::ok(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "serverInfo": { "name": SERVER_NAME, "version": crate::VERSION },
                    "capabilities": { "tools": {} },
                }),
            ),
            "ping" => Response::ok(id, json!({})),
            "tools/list" => Response::ok(id, json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.call_tool(id, request.params),
            other => {
                tracing::warn!("unknown method {}", other);
                Response::err(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
            }
        };
        Some(response)
    }

    fn call_tool(&mut self, id: Json, params: Json) -> Response {
        let params: CallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => return Response::err(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        };
        if params.name != TOOL_NAME {
            return Response::err(id, INVALID_PARAMS, format!("Unknown tool: {}", params.name));
        }
        let Some(expression) = params.arguments.expression else {
            return Response::err(id, INVALID_PARAMS, "Missing argument: expression");
        };

        let (text, is_error) = match self.interp.run(&expression) {
            Ok(value) => (value.to_string(), false),
            Err(e) => (format!("Error evaluating expression: {}", e), true),
        };
        Response::ok(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": is_error,
            }),
        )
    }
}

fn tool_descriptor() -> Json {
    json!({
        "name": TOOL_NAME,
        "description": "Evaluates integer expressions with variables, factorial and render(...)",
        "inputSchema": {
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Expression to evaluate (e.g. '2 + 3 * 4', 'x = 5', 'render(1 + 2)')"
                }
            },
            "required": ["expression"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(server: &mut ToolServer, id: i64, expression: &str) -> Json {
        let line = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": "calculate", "arguments": { "expression": expression } }
        })
        .to_string();
        server.handle_message(&line).unwrap().result.unwrap()
    }

    #[test]
    fn test_initialize() {
        let mut server = ToolServer::default();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .unwrap();
        assert_eq!(resp.id, json!(1));
        assert_eq!(resp.result.unwrap()["serverInfo"]["name"], "tally");
    }

    #[test]
    fn test_tools_list() {
        let mut server = ToolServer::default();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#)
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["tools"][0]["name"], "calculate");
        assert_eq!(result["tools"][0]["inputSchema"]["required"][0], "expression");
    }

    #[test]
    fn test_calculate_keeps_session_state() {
        let mut server = ToolServer::default();
        let first = call(&mut server, 1, "x = 6");
        assert_eq!(first["content"][0]["text"], "6");
        let second = call(&mut server, 2, "x * 7");
        assert_eq!(second["content"][0]["text"], "42");
        assert_eq!(second["isError"], false);
    }

    #[test]
    fn test_calculate_reports_errors_in_band() {
        let mut server = ToolServer::default();
        let result = call(&mut server, 1, "10 % 0");
        assert_eq!(
            result["content"][0]["text"],
            "Error evaluating expression: Modulo by zero"
        );
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn test_notification_gets_no_response() {
        let mut server = ToolServer::default();
        let resp =
            server.handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        assert!(resp.is_none());
    }

    #[test]
    fn test_null_id_is_a_request() {
        let mut server = ToolServer::default();
        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .unwrap();
        assert_eq!(resp.id, Json::Null);
        assert_eq!(resp.result, Some(json!({})));
    }

    #[test]
    fn test_rejects_wrong_jsonrpc_version() {
        let mut server = ToolServer::default();
        let resp = server
            .handle_message(r#"{"jsonrpc":"1.0","id":7,"method":"ping"}"#)
            .unwrap();
        assert_eq!(resp.id, json!(7));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = server.handle_message(r#"{"id":8,"method":"ping"}"#).unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn test_deep_nesting_keeps_session_alive() {
        let mut server = ToolServer::default();
        let deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let result = call(&mut server, 1, &deep);
        assert_eq!(result["isError"], true);
        assert_eq!(call(&mut server, 2, "1 + 1")["content"][0]["text"], "2");
    }

    #[test]
    fn test_protocol_errors() {
        let mut server = ToolServer::default();

        let resp = server.handle_message("{not json").unwrap();
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);

        let resp = server
            .handle_message(r#"{"jsonrpc":"2.0","id":3,"method":"nope"}"#)
            .unwrap();
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);

        let resp = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"other"}}"#,
            )
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn test_serve_writes_one_line_per_response() {
        let mut server = ToolServer::default();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        );
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n");
    }
}
