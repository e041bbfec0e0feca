//! amos script generation
//!
//! Expands a [`Procedure`](amos_procedure::Procedure) into a standalone
//! POSIX shell script:
//!
//! - **Fragments**: flag variables, globals, input handling, parser arms,
//!   help text, function bodies and main dispatch
//! - **Template**: the shared base script and its markers
//! - **Renderer**: splices fragments and header metadata into the template
//!
//! # Example
//!
//! ```rust,ignore
//! use amos_codegen::{BaseTemplate, RenderOptions, ScriptRenderer};
//!
//! let renderer = ScriptRenderer::new(BaseTemplate::embedded());
//! let script = renderer.render(&procedure, &RenderOptions::default());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod fragments;
pub mod render;
pub mod template;
pub mod test_script;

pub use error::{CodegenError, CodegenResult};
pub use render::{RenderOptions, ScriptRenderer};
pub use template::{BaseTemplate, Marker, TemplateOrigin, EMBEDDED_BASE, HEADER_TOKENS};
pub use test_script::test_script;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
