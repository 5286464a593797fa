//! il2dump-core
//!
//! Core library for reconstructing source-like declarations from a live IL2CPP
//! runtime by calling the runtime's own introspection API.
//!
//! This crate defines the runtime API binding, the attachment sequence, the
//! metadata walker, member extractors, the declaration renderer and the output
//! aggregator. Frontends (the CLI and the injectable payload) stay thin so that
//! everything here can be exercised against an in-memory runtime in tests.

pub mod api;
pub mod config;
pub mod dump;
pub mod members;
pub mod model;
pub mod output;
pub mod render;
pub mod runtime;
pub mod walker;

pub use config::DumpConfig;
pub use dump::{dump, DumpError, DumpResult, DumpSummary};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
