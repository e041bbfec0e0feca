//! amos procedure definitions
//!
//! A procedure is one YAML file describing an ATT&CK technique emulation:
//! header metadata, command-line arguments, global variables and shell
//! function bodies. This crate owns the data side of the build:
//!
//! - **Loading**: YAML text into a JSON value and a typed [`Procedure`]
//! - **Validation**: JSON-schema checks with fix hints
//! - **Documents**: order-preserving raw YAML for converters
//!
//! # Example
//!
//! ```rust,ignore
//! use amos_procedure::{ProcedureSchema, ProcedureSource};
//!
//! let source = ProcedureSource::load("attackmacos/core/config/system_info.yml")?;
//! let report = ProcedureSchema::embedded()?.validate(source.value());
//! assert!(report.is_valid());
//! let procedure = source.to_procedure()?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod loader;
pub mod model;
pub mod option;
pub mod schema;
pub mod tactic;
pub mod version;

pub use document::ProcedureDocument;
pub use error::{OptionError, ProcedureError, ProcedureResult};
pub use loader::{load_procedure, ProcedureSource};
pub use model::{
    Argument, ArgumentKind, ArgumentType, CheckFda, Detection, Function, GlobalVariable, Opsec,
    Platform, Procedure, ProcedureBody, Resource, VariableType, GUID_PLACEHOLDER,
    UPDATED_PLACEHOLDER,
};
pub use option::OptionSpec;
pub use schema::{FixHint, ProcedureSchema, SchemaViolation, ValidationReport};
pub use tactic::Tactic;
pub use version::bump_patch;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
