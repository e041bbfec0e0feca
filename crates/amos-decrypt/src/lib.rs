//! amos output decryption
//!
//! Scripts can encrypt their output with `--encrypt aes|gpg|xor`. This
//! crate reverses that: AES-256-CBC and GPG through the system `openssl`
//! and `gpg`, XOR natively, with format auto-detection and parsing of the
//! JSON output envelope.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod decryptor;
pub mod envelope;
pub mod error;
pub mod interactive;
pub mod method;
pub mod xor;

pub use decryptor::{aes_args, gpg_args, Decryptor, DEFAULT_TIMEOUT};
pub use envelope::Envelope;
pub use error::{DecryptError, DecryptResult};
pub use interactive::run_interactive;
pub use method::{detect, Method, PGP_ARMOR};
pub use xor::{decrypt_xor, encrypt_xor, xor_bytes, XOR_PREFIX};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
