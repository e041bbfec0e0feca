//! amos LOOBins conversion
//!
//! Turns a LOOBins ("Living Off the Orchard") catalog entry into a
//! procedure YAML ready for review and build.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod convert;
pub mod error;
pub mod loobin;

pub use convert::{
    convert, convert_on, embedded_template, load_template, output_path, write_procedure,
    EMBEDDED_TEMPLATE,
};
pub use error::{ConvertError, ConvertResult};
pub use loobin::{LoobinDetection, LoobinEntry, LoobinResource, UseCase};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
