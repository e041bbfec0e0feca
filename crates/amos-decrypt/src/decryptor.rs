//! Method dispatch
//!
//! AES and GPG shell out to the same tools the scripts encrypt with; the
//! payload goes in on stdin and the plaintext comes back on stdout.

use crate::error::{DecryptError, DecryptResult};
use crate::method::{detect, Method};
use crate::xor::decrypt_xor;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default limit for one external tool run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Decrypts procedure output
#[derive(Debug, Clone)]
pub struct Decryptor {
    timeout: Duration,
}

impl Default for Decryptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decryptor {
    /// Decryptor with [`DEFAULT_TIMEOUT`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the external tool timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve [`Method::Auto`] against `data`
    ///
    /// # Errors
    /// Returns `DecryptError::UndetectableMethod` when auto detection fails
    pub fn resolve(method: Method, data: &str) -> DecryptResult<Method> {
        match method {
            Method::Auto => {
                let detected = detect(data).ok_or(DecryptError::UndetectableMethod)?;
                debug!(method = %detected, "auto-detected method");
                Ok(detected)
            }
            other => Ok(other),
        }
    }

    /// Decrypt `data` with `key`
    ///
    /// # Errors
    /// Returns error for an empty key, an undetectable payload, a missing
    /// or failing tool, or malformed XOR input
    pub async fn decrypt(&self, method: Method, data: &str, key: &str) -> DecryptResult<String> {
        if key.is_empty() {
            return Err(DecryptError::EmptyKey);
        }
        match Self::resolve(method, data)? {
            Method::Aes => {
                debug!(key_len = key.len(), "AES decryption");
                self.pipe("openssl", &aes_args(key), data).await
            }
            Method::Gpg => {
                debug!("GPG decryption");
                self.pipe("gpg", &gpg_args(key), data).await
            }
            Method::Xor | Method::Auto => decrypt_xor(data, key),
        }
    }

    async fn pipe(&self, tool: &'static str, args: &[String], input: &str) -> DecryptResult<String> {
        let mut child = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DecryptError::ToolMissing { tool },
                _ => DecryptError::ToolIo { tool, source: e },
            })?;

        let mut payload = input.to_string();
        // openssl's base64 reader needs the final newline
        if !payload.ends_with('\n') {
            payload.push('\n');
        }
        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(payload.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        // stdin is fed while stdout and stderr drain, all under one deadline
        let exchange = async move { tokio::join!(write, child.wait_with_output()) };
        let (written, output) = match timeout(self.timeout, exchange).await {
            Ok(pair) => pair,
            Err(_) => {
                return Err(DecryptError::TimedOut {
                    tool,
                    secs: self.timeout.as_secs(),
                })
            }
        };
        let output = output.map_err(|source| DecryptError::ToolIo { tool, source })?;

        if !output.status.success() {
            return Err(DecryptError::ToolFailed {
                tool,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // a tool that exits early closes its stdin; its status says more
        written.map_err(|source| DecryptError::ToolIo { tool, source })?;
        debug!(tool, "decryption successful");
        String::from_utf8(output.stdout).map_err(|_| DecryptError::NotUtf8)
    }
}

/// `openssl` arguments for AES-256-CBC with a passphrase
#[must_use]
pub fn aes_args(key: &str) -> Vec<String> {
    ["enc", "-aes-256-cbc", "-d", "-base64", "-k", key]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// `gpg` arguments for symmetric decryption with a passphrase
#[must_use]
pub fn gpg_args(key: &str) -> Vec<String> {
    [
        "--batch",
        "--yes",
        "--quiet",
        "--pinentry-mode",
        "loopback",
        "--decrypt",
        "--cipher-algo",
        "AES256",
        "--passphrase",
        key,
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_key_is_rejected_before_dispatch() {
        let err = Decryptor::new().decrypt(Method::Aes, "U2FsdGVk", "").await.unwrap_err();
        assert!(matches!(err, DecryptError::EmptyKey));
    }

    #[tokio::test]
    async fn auto_dispatches_xor_natively() {
        let plain = Decryptor::new()
            .decrypt(Method::Auto, "XOR-ENCRYPTED:MDMwMjpr", "k")
            .await
            .unwrap();
        assert_eq!(plain, "hi");
    }

    #[tokio::test]
    async fn auto_fails_on_unknown_format() {
        let err = Decryptor::new().decrypt(Method::Auto, "???", "k").await.unwrap_err();
        assert!(matches!(err, DecryptError::UndetectableMethod));
    }

    #[tokio::test]
    async fn large_payload_is_streamed_through_the_tool() {
        if !amos_test_utils::has_program("cat") {
            return;
        }
        let payload = "0123456789abcdef".repeat(64 * 1024);
        let echoed = Decryptor::new()
            .with_timeout(Duration::from_secs(20))
            .pipe("cat", &[], &payload)
            .await
            .unwrap();
        assert_eq!(echoed.len(), payload.len() + 1);
        assert!(echoed.starts_with(&payload));
    }

    #[tokio::test]
    async fn slow_tool_hits_the_deadline() {
        if !amos_test_utils::has_program("sleep") {
            return;
        }
        let started = std::time::Instant::now();
        let err = Decryptor::new()
            .with_timeout(Duration::from_millis(200))
            .pipe("sleep", &["10".to_string()], "")
            .await
            .unwrap_err();
        assert!(matches!(err, DecryptError::TimedOut { tool: "sleep", .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let err = Decryptor::new()
            .pipe("amos-no-such-tool", &[], "x")
            .await
            .unwrap_err();
        assert!(matches!(err, DecryptError::ToolMissing { .. }));
    }

    #[test]
    fn tool_arguments() {
        assert_eq!(aes_args("pw"), vec!["enc", "-aes-256-cbc", "-d", "-base64", "-k", "pw"]);
        assert_eq!(gpg_args("pw")[3..5], ["loopback".to_string(), "--decrypt".to_string()]);
        assert_eq!(gpg_args("pw").last().map(String::as_str), Some("pw"));
    }
}
