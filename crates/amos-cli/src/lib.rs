//! amos command line
//!
//! The `amos` binary drives the workspace crates: building and validating
//! procedures, syncing the Caldera plugin and function docs, converting
//! LOOBins entries, decrypting script output and ATT&CK reports.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod style;

pub use cli::command;
pub use commands::dispatch;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
