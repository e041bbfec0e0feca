//! Shell checks for generated scripts
//!
//! Every script goes through `sh -n` and then, when installed,
//! `shellcheck` at error severity. Both run inside the script's directory
//! under their own timeouts.

use crate::config::BuildConfig;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Result of checking one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Script is usable; `shellcheck` tells whether shellcheck also ran
    Passed { shellcheck: bool },
    /// `sh -n` rejected the script
    SyntaxError(String),
    /// shellcheck reported errors
    ShellcheckErrors(String),
}

impl CheckOutcome {
    /// True for [`CheckOutcome::Passed`]
    #[inline]
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed { .. })
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Passed { shellcheck: true } => f.write_str("passed (sh -n + shellcheck)"),
            CheckOutcome::Passed { shellcheck: false } => f.write_str("passed (sh -n)"),
            CheckOutcome::SyntaxError(stderr) => write!(f, "syntax error: {}", stderr.trim()),
            CheckOutcome::ShellcheckErrors(stdout) => write!(f, "shellcheck errors: {}", stdout.trim()),
        }
    }
}

enum RunError {
    NotFound,
    TimedOut,
    Spawn(std::io::Error),
}

struct RunOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Runs `sh -n` and `shellcheck`
#[derive(Debug, Clone)]
pub struct ShellChecker {
    syntax_timeout: Duration,
    shellcheck_timeout: Duration,
    excludes: Vec<String>,
}

impl ShellChecker {
    /// Checker from build settings
    #[must_use]
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            syntax_timeout: config.syntax_timeout(),
            shellcheck_timeout: config.shellcheck_timeout(),
            excludes: config.shellcheck_excludes.clone(),
        }
    }

    /// Arguments passed to shellcheck before the file name
    #[must_use]
    pub fn shellcheck_args(&self) -> Vec<String> {
        vec![
            "-f".to_string(),
            "gcc".to_string(),
            "-e".to_string(),
            self.excludes.join(","),
            "-S".to_string(),
            "error".to_string(),
        ]
    }

    /// Check `script`
    pub async fn check(&self, script: &Path) -> CheckOutcome {
        let dir = script.parent().unwrap_or_else(|| Path::new("."));
        let file_name = script.file_name().map_or_else(
            || script.as_os_str().to_os_string(),
            std::ffi::OsStr::to_os_string,
        );

        let syntax_args = [std::ffi::OsString::from("-n"), file_name.clone()];
        match run("sh", &syntax_args, dir, self.syntax_timeout).await {
            Ok(out) if out.success => debug!(script = %script.display(), "sh -n passed"),
            Ok(out) => return CheckOutcome::SyntaxError(out.stderr),
            Err(RunError::TimedOut) => {
                return CheckOutcome::SyntaxError(format!(
                    "sh -n timed out after {}s",
                    self.syntax_timeout.as_secs()
                ));
            }
            Err(RunError::NotFound) => return CheckOutcome::SyntaxError("sh not found".to_string()),
            Err(RunError::Spawn(e)) => return CheckOutcome::SyntaxError(format!("syntax check failed: {e}")),
        }

        let mut args: Vec<std::ffi::OsString> = self.shellcheck_args().into_iter().map(Into::into).collect();
        args.push(file_name);
        match run("shellcheck", &args, dir, self.shellcheck_timeout).await {
            Ok(out) if out.success => CheckOutcome::Passed { shellcheck: true },
            Ok(out) => CheckOutcome::ShellcheckErrors(out.stdout),
            Err(RunError::NotFound) => {
                debug!("shellcheck not installed");
                CheckOutcome::Passed { shellcheck: false }
            }
            Err(RunError::TimedOut) => {
                warn!(
                    script = %script.display(),
                    "shellcheck timed out after {}s, skipping",
                    self.shellcheck_timeout.as_secs()
                );
                CheckOutcome::Passed { shellcheck: false }
            }
            Err(RunError::Spawn(e)) => {
                warn!(script = %script.display(), error = %e, "shellcheck failed to run, skipping");
                CheckOutcome::Passed { shellcheck: false }
            }
        }
    }
}

impl Default for ShellChecker {
    fn default() -> Self {
        Self::new(&BuildConfig::default())
    }
}

async fn run(
    program: &str,
    args: &[std::ffi::OsString],
    dir: &Path,
    limit: Duration,
) -> Result<RunOutput, RunError> {
    let child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => RunError::NotFound,
            _ => RunError::Spawn(e),
        })?;

    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(RunOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
        Ok(Err(e)) => Err(RunError::Spawn(e)),
        Err(_) => Err(RunError::TimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shellcheck_arguments_follow_config() {
        let args = ShellChecker::default().shellcheck_args();
        assert_eq!(args, vec!["-f", "gcc", "-e", "SC2034,SC3043,SC2155,SC2046", "-S", "error"]);
    }

    #[tokio::test]
    async fn valid_script_passes() {
        if !amos_test_utils::has_program("sh") {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.sh");
        std::fs::write(&path, "#!/bin/sh\necho ok\n").unwrap();

        let outcome = ShellChecker::default().check(&path).await;
        assert!(outcome.is_passed(), "{outcome}");
    }

    #[tokio::test]
    async fn broken_script_reports_syntax_error() {
        if !amos_test_utils::has_program("sh") {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.sh");
        std::fs::write(&path, "#!/bin/sh\nif [ 1 = 1 ]; then\n  echo missing fi\n").unwrap();

        let outcome = ShellChecker::default().check(&path).await;
        assert!(matches!(outcome, CheckOutcome::SyntaxError(_)), "{outcome}");
    }
}
