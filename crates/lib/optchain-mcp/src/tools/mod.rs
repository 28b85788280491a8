//! MCP tool modules.
//!
//! Tools are grouped by domain: filtered options chains, historical prices,
//! and contextual help for the filtering rules.

pub mod chain;
pub mod history;
mod context;
