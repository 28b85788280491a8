//! Option contract models and wire constants for optchain-mcp.
//!
//! This crate defines the typed data model shared by the upstream parsers,
//! the strike selection pipeline, and the MCP tool surface.

pub mod models;
pub mod schema;

pub use models::*;
