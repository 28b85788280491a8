//! Parsers for upstream market-data payloads.
//!
//! Parsers normalize loosely typed brokerage responses into the typed model
//! so that the filtering pipeline never sees raw JSON.

pub mod tradier;

pub use tradier::{ChainParseOptions, ChainParseOutput, TradierParser};
