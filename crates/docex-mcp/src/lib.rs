//! docex MCP Server
//!
//! Model Context Protocol server exposing the extraction pipeline to AI
//! clients over stdio.
//!
//! Provides one MCP tool:
//! - `extract_document_data` - Extract named fields from a PDF, DOCX, PNG or JPG
//!
//! Pipeline failures are reported inside the tool result (`isError: true`
//! with the full `ExtractionResult`), never as JSON-RPC errors. JSON-RPC
//! errors are reserved for malformed calls.
//!
//! # Example
//!
//! ```no_run
//! use docex_mcp::McpServer;
//! use docex_orchestrator::Settings;
//!
//! let settings = Settings::load(None).unwrap();
//! let server = McpServer::new(&settings).unwrap();
//! server.run().unwrap();
//! ```

#![warn(missing_docs)]

mod error;
mod protocol;
mod server;
mod tools;

pub use error::McpError;
pub use protocol::JsonRpcRequest;
pub use server::{McpServer, PROTOCOL_VERSION};
pub use tools::EXTRACT_TOOL;
