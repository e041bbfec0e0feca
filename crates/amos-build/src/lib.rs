//! amos build pipeline
//!
//! Turns procedure YAML in a project tree into checked, stamped scripts:
//!
//! - **Layout**: `amos.toml` and the conventional directory tree
//! - **Builder**: validate, render, write, check, stamp, test script
//! - **Checks**: `sh -n` and `shellcheck` under timeouts
//! - **Stamping**: GUID and date placeholders after a successful build
//! - **Caldera**: payload and ability export for the Caldera plugin
//!
//! # Example
//!
//! ```rust,ignore
//! use amos_build::{Builder, ProjectLayout};
//!
//! let builder = Builder::new(ProjectLayout::open(".")?)?;
//! let summary = builder.build_all(false).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod caldera;
pub mod check;
pub mod config;
pub mod error;
pub mod output;
pub mod stamp;

pub use builder::{BuildOutcome, BuildSummary, Builder, SCRIPT_MODE};
pub use caldera::{abilities_reference, Ability, CalderaSync, SyncSummary};
pub use check::{CheckOutcome, ShellChecker};
pub use config::{BuildConfig, PathsConfig, ProjectConfig, ProjectLayout, CONFIG_FILE, ROOT_ENV};
pub use error::{BuildError, BuildResult};
pub use output::{select_output, Disposition, OutputChoice};
pub use stamp::{Stamp, Stamper};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
