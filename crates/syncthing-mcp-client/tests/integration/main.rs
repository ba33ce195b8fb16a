//! Integration tests for syncthing-mcp-client
//!
//! Uses wiremock to simulate the Syncthing REST API and verifies the
//! client's request shape, error mapping and the use cases running over it.

mod common;

mod test_client;
mod test_provider;
mod test_report;
