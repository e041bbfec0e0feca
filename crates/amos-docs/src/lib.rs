//! amos function documentation
//!
//! Keeps `docs/Functions/Shell` in step with the `core_` functions of the
//! base template. Each function gets one markdown page whose code block
//! is rewritten on every sync.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod functions;
pub mod markdown;
pub mod sync;

pub use error::{DocsError, DocsResult};
pub use functions::{doc_file_name, extract_core_functions, title};
pub use markdown::{render_new_doc, update_doc, DocUpdate};
pub use sync::{sync_function_docs, SyncReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
