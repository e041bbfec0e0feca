//! Output file selection

use std::fmt;
use std::path::{Path, PathBuf};

/// How a script path was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// No script existed
    New,
    /// Forced over an existing script
    Overwrite,
    /// Existing script kept, written as `<name>_vN.sh`
    Version(u32),
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::New => f.write_str("new"),
            Disposition::Overwrite => f.write_str("overwrite"),
            Disposition::Version(n) => write!(f, "version {n}"),
        }
    }
}

/// Selected script path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChoice {
    /// Path to write
    pub path: PathBuf,
    /// Why this path
    pub disposition: Disposition,
}

/// Pick the script path for `name` inside `dir`
///
/// With `force` the plain `<name>.sh` is reused. Otherwise an existing
/// script is preserved and the first free `<name>_vN.sh` is chosen.
#[must_use]
pub fn select_output(dir: &Path, name: &str, force: bool) -> OutputChoice {
    let base = dir.join(format!("{name}.sh"));
    if !base.exists() {
        return OutputChoice {
            path: base,
            disposition: Disposition::New,
        };
    }
    if force {
        return OutputChoice {
            path: base,
            disposition: Disposition::Overwrite,
        };
    }

    let mut version = 1;
    loop {
        let candidate = dir.join(format!("{name}_v{version}.sh"));
        if !candidate.exists() {
            return OutputChoice {
                path: candidate,
                disposition: Disposition::Version(version),
            };
        }
        version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_directory_gets_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        let choice = select_output(dir.path(), "system_info", false);
        assert_eq!(choice.path, dir.path().join("system_info.sh"));
        assert_eq!(choice.disposition, Disposition::New);
    }

    #[test]
    fn existing_scripts_are_versioned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("system_info.sh"), "").unwrap();
        std::fs::write(dir.path().join("system_info_v1.sh"), "").unwrap();

        let choice = select_output(dir.path(), "system_info", false);
        assert_eq!(choice.path, dir.path().join("system_info_v2.sh"));
        assert_eq!(choice.disposition, Disposition::Version(2));
    }

    #[test]
    fn force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("system_info.sh"), "").unwrap();

        let choice = select_output(dir.path(), "system_info", true);
        assert_eq!(choice.path, dir.path().join("system_info.sh"));
        assert_eq!(choice.disposition, Disposition::Overwrite);
    }
}
