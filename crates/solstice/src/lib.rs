//! Solstice - Solidity static analyzer library and CLI.
//!
//! The engine, tree model, and builtin rules live in their own crates
//! (`solstice-engine`, `solstice-ast`, `solstice-rules`); this crate ties
//! them into a tool:
//! - config file discovery and loading
//! - gitignore-aware source discovery
//! - parallel analysis across files
//! - human and JSON output

pub mod cli;
pub mod output;
pub mod runner;
pub mod walk;
