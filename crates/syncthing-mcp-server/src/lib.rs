//! syncthing-mcp Server - MCP tool layer and transports
//!
//! This crate provides:
//! - [`tools`] - tool catalog, typed inputs and dispatch to the daemon
//! - [`rpc`] - MCP JSON-RPC 2.0 message handling
//! - [`stdio`] and [`http`] - the two transports

pub mod http;
pub mod rpc;
pub mod stdio;
pub mod tools;

pub use rpc::McpHandler;
pub use tools::{ToolDispatcher, ToolOutput};
