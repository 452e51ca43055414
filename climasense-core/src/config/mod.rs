//! Configuration types
//!
//! Board-agnostic node configuration, parsed from `node.toml` text.

pub mod parse;
pub mod types;

pub use parse::parse_config;
pub use types::*;
