//! Core services for optchain-mcp.
//!
//! This crate owns strike significance selection, the liquidity filter, the
//! per-request chain pipeline, and the market-data client that feeds it.

pub mod control;
pub mod market;
pub mod parsers;
pub mod pipeline;
pub mod quality;
pub mod strikes;
