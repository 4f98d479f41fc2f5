//! MCP server implementation

use docex_orchestrator::{Collaborators, Orchestrator, Settings};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::error::McpError;
use crate::protocol::*;
use crate::tools;

/// Protocol revision announced in `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Server
///
/// Handles Model Context Protocol requests via stdio transport.
pub struct McpServer {
    orchestrator: Arc<Orchestrator>,
    runtime: Runtime,
}

impl McpServer {
    /// Create a new MCP server from loaded settings
    pub fn new(settings: &Settings) -> Result<Self, McpError> {
        let collaborators = Collaborators::from_settings(settings)?;
        Self::with_orchestrator(Arc::new(Orchestrator::new(settings, &collaborators)))
    }

    /// Create a server around an existing orchestrator
    pub fn with_orchestrator(orchestrator: Arc<Orchestrator>) -> Result<Self, McpError> {
        let runtime = Runtime::new()?;
        Ok(Self { orchestrator, runtime })
    }

    /// Run the MCP server (stdio transport)
    ///
    /// Reads JSON-RPC requests from stdin and writes responses to stdout.
    pub fn run(&self) -> Result<(), McpError> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.serve(BufReader::new(stdin.lock()), &mut stdout)
    }

    /// Serve newline-delimited JSON-RPC until the reader is exhausted
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, writer: &mut W) -> Result<(), McpError> {
        info!("MCP server started");

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received request: {}", line);
            if let Some(response) = self.handle_line(&line) {
                self.write_response(writer, &response)?;
            }
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one raw request line
    ///
    /// Returns `None` for notifications, which get no reply.
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Some(error_value(None, -32700, format!("Parse error: {}", e)));
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        Some(self.handle_request(request))
    }

    /// Handle a JSON-RPC request
    pub fn handle_request(&self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            return error_value(id, -32600, format!("Unsupported jsonrpc version: {}", request.jsonrpc));
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => encode(JsonRpcResponse::new(id, json!({}))),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tool_call(id, request.params),
            _ => error_value(id, -32601, format!("Method not found: {}", request.method)),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<Value>) -> Value {
        let response = InitializeResponse::new(PROTOCOL_VERSION, "docex-mcp", env!("CARGO_PKG_VERSION"));

        encode(JsonRpcResponse::new(id, encode(response)))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> Value {
        let response = ToolListResponse {
            tools: vec![tools::extract_definition()],
        };
        encode(JsonRpcResponse::new(id, encode(response)))
    }

    /// Handle tools/call request
    fn handle_tool_call(&self, id: Option<Value>, params: Value) -> Value {
        let tool_name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name,
            None => return error_value(id, -32602, "Missing tool name".to_string()),
        };

        let tool_params = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let result = match tool_name {
            tools::EXTRACT_TOOL => self.call_extract_tool(tool_params),
            _ => Err(McpError::ToolNotFound(tool_name.to_string())),
        };

        match result {
            Ok(value) => encode(JsonRpcResponse::new(id, value)),
            Err(e) => {
                warn!(tool = tool_name, error = %e, "Tool call rejected");
                error_value(id, e.error_code(), e.to_string())
            }
        }
    }

    /// Call extract tool
    fn call_extract_tool(&self, params: Value) -> Result<Value, McpError> {
        let params: tools::ExtractParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidRequest(e.to_string()))?;
        let result = self
            .runtime
            .block_on(tools::handle_extract(&self.orchestrator, params));

        let structured = serde_json::to_value(&result)?;
        Ok(encode(ToolCallResult::structured(structured, !result.success)?))
    }

    /// Write response to the transport
    fn write_response<W: Write>(&self, writer: &mut W, response: &Value) -> Result<(), McpError> {
        let response_str = serde_json::to_string(response)?;
        writeln!(writer, "{}", response_str)?;
        writer.flush()?;
        debug!("Sent response: {}", response_str);
        Ok(())
    }
}

fn error_value(id: Option<Value>, code: i32, message: String) -> Value {
    encode(JsonRpcError::new(id, code, message))
}

// Protocol structs hold only strings and JSON values, so this never takes the fallback arm.
fn encode<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32603, "message": format!("Internal error: {}", e)}
        })
    })
}
