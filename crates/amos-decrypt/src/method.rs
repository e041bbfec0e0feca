//! Encryption methods and format detection

use crate::error::DecryptError;
use crate::xor::XOR_PREFIX;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

/// Armor line of GPG output
pub const PGP_ARMOR: &str = "-----BEGIN PGP MESSAGE-----";

/// How a payload was encrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// `openssl enc -aes-256-cbc -base64`
    Aes,
    /// `gpg --symmetric`, armored
    Gpg,
    /// Repeating-key XOR in the `XOR-ENCRYPTED:` envelope
    Xor,
    /// Detect from the payload
    #[default]
    Auto,
}

impl Method {
    /// Lower-case method name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Aes => "aes",
            Method::Gpg => "gpg",
            Method::Xor => "xor",
            Method::Auto => "auto",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DecryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aes" => Ok(Method::Aes),
            "gpg" => Ok(Method::Gpg),
            "xor" => Ok(Method::Xor),
            "auto" => Ok(Method::Auto),
            other => Err(DecryptError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Guess the method from the payload; `None` when nothing matches
#[must_use]
pub fn detect(data: &str) -> Option<Method> {
    let data = data.trim();
    if data.starts_with(PGP_ARMOR) {
        tracing::debug!("detected GPG armored format");
        return Some(Method::Gpg);
    }
    if data.starts_with(XOR_PREFIX) {
        tracing::debug!("detected XOR envelope");
        return Some(Method::Xor);
    }
    // openssl wraps base64 at 64 columns
    let compact: String = data.split_whitespace().collect();
    match STANDARD.decode(compact) {
        Ok(bytes) if !bytes.is_empty() => {
            tracing::debug!("detected base64, assuming AES");
            Some(Method::Aes)
        }
        _ => {
            tracing::debug!("could not detect encryption method");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("AES".parse::<Method>().unwrap(), Method::Aes);
        assert_eq!(" gpg ".parse::<Method>().unwrap(), Method::Gpg);
        assert!(matches!("rot13".parse::<Method>(), Err(DecryptError::UnsupportedMethod(m)) if m == "rot13"));
        assert_eq!(Method::default().to_string(), "auto");
    }

    #[test]
    fn detection_order() {
        assert_eq!(detect("-----BEGIN PGP MESSAGE-----\n\njA0E\n"), Some(Method::Gpg));
        assert_eq!(detect("XOR-ENCRYPTED:MDA6YWI="), Some(Method::Xor));
        assert_eq!(detect("U2FsdGVk\nX18AAAAA\n"), Some(Method::Aes));
        assert_eq!(detect("U2FsdGVkX18AAAAAAAAAAA=="), Some(Method::Aes));
        assert_eq!(detect("not base64 at all!"), None);
        assert_eq!(detect("   "), None);
    }
}
