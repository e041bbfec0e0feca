//! Project configuration and layout
//!
//! A project is a directory tree holding procedure YAML, the base template
//! and generated scripts. Locations default to the conventional tree and
//! can be overridden in an optional `amos.toml` at the project root:
//!
//! ```toml
//! [paths]
//! config_dir = "attackmacos/core/config"
//! ttp_dir = "attackmacos/ttp"
//!
//! [build]
//! shellcheck_timeout_secs = 60
//! generate_tests = false
//! ```

use crate::error::{BuildError, BuildResult};
use amos_procedure::{Procedure, Tactic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional project config file
pub const CONFIG_FILE: &str = "amos.toml";

/// Environment variable naming the project root
pub const ROOT_ENV: &str = "AMOS_ROOT";

/// Project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory locations
    pub paths: PathsConfig,
    /// Build behavior
    pub build: BuildConfig,
}

impl ProjectConfig {
    /// Parse config text
    ///
    /// # Errors
    /// Returns `BuildError::Config` if the TOML is malformed
    pub fn parse(path: impl AsRef<Path>, text: &str) -> BuildResult<Self> {
        toml::from_str(text).map_err(|source| BuildError::Config {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Load `amos.toml` from `root`, or defaults when absent
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load_or_default(root: impl AsRef<Path>) -> BuildResult<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no project config, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| BuildError::io_error(&path, e))?;
        Self::parse(&path, &text)
    }
}

/// `[paths]` section, relative entries resolve against the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Procedure YAML directory
    pub config_dir: PathBuf,
    /// Base shell template
    pub base_template: PathBuf,
    /// Procedure JSON schema
    pub schema: PathBuf,
    /// Procedure YAML template used by conversions
    pub procedure_template: PathBuf,
    /// Root of generated scripts
    pub ttp_dir: PathBuf,
    /// Generated smoke-test scripts
    pub test_scripts_dir: PathBuf,
    /// Caldera plugin checkout
    pub caldera_plugin_dir: PathBuf,
    /// Core function documentation
    pub function_docs_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("attackmacos/core/config"),
            base_template: PathBuf::from("attackmacos/core/base/base.sh"),
            schema: PathBuf::from("attackmacos/core/schemas/procedure.schema.json"),
            procedure_template: PathBuf::from("attackmacos/core/templates/procedure.yml"),
            ttp_dir: PathBuf::from("attackmacos/ttp"),
            test_scripts_dir: PathBuf::from("cicd/test_scripts"),
            caldera_plugin_dir: PathBuf::from("integrations/caldera/plugins/attackmacos"),
            function_docs_dir: PathBuf::from("docs/Functions/Shell"),
        }
    }
}

/// `[build]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Timeout for `sh -n`
    pub syntax_timeout_secs: u64,
    /// Timeout for `shellcheck`
    pub shellcheck_timeout_secs: u64,
    /// Shellcheck codes passed to `-e`
    pub shellcheck_excludes: Vec<String>,
    /// Write a smoke-test script next to every build
    pub generate_tests: bool,
}

impl BuildConfig {
    /// Syntax check timeout
    #[inline]
    #[must_use]
    pub fn syntax_timeout(&self) -> Duration {
        Duration::from_secs(self.syntax_timeout_secs)
    }

    /// Shellcheck timeout
    #[inline]
    #[must_use]
    pub fn shellcheck_timeout(&self) -> Duration {
        Duration::from_secs(self.shellcheck_timeout_secs)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            syntax_timeout_secs: 10,
            shellcheck_timeout_secs: 30,
            shellcheck_excludes: ["SC2034", "SC3043", "SC2155", "SC2046"]
                .into_iter()
                .map(String::from)
                .collect(),
            generate_tests: true,
        }
    }
}

/// Resolved locations for one project
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    config: ProjectConfig,
}

impl ProjectLayout {
    /// Layout with an explicit config
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Open the project at `root`, reading `amos.toml` when present
    ///
    /// # Errors
    /// Returns error if the config file is unreadable or malformed
    pub fn open(root: impl Into<PathBuf>) -> BuildResult<Self> {
        let root = root.into();
        let config = ProjectConfig::load_or_default(&root)?;
        Ok(Self::new(root, config))
    }

    /// Project root: explicit value, else the current directory
    ///
    /// # Errors
    /// Returns error if the current directory is unavailable
    pub fn resolve_root(explicit: Option<PathBuf>) -> BuildResult<PathBuf> {
        match explicit {
            Some(root) => Ok(root),
            None => std::env::current_dir().map_err(|e| BuildError::io_error(".", e)),
        }
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded config
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Procedure YAML directory
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.config_dir)
    }

    /// Base shell template
    #[must_use]
    pub fn base_template(&self) -> PathBuf {
        self.resolve(&self.config.paths.base_template)
    }

    /// Procedure JSON schema
    #[must_use]
    pub fn schema(&self) -> PathBuf {
        self.resolve(&self.config.paths.schema)
    }

    /// Procedure YAML template
    #[must_use]
    pub fn procedure_template(&self) -> PathBuf {
        self.resolve(&self.config.paths.procedure_template)
    }

    /// Root of generated scripts
    #[must_use]
    pub fn ttp_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.ttp_dir)
    }

    /// Smoke-test script directory
    #[must_use]
    pub fn test_scripts_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.test_scripts_dir)
    }

    /// Caldera plugin directory
    #[must_use]
    pub fn caldera_plugin_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.caldera_plugin_dir)
    }

    /// Core function documentation directory
    #[must_use]
    pub fn function_docs_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.function_docs_dir)
    }

    /// Script directory for a tactic: `<ttp_dir>/<tactic dir>/shell`
    #[must_use]
    pub fn output_dir(&self, tactic: &Tactic) -> PathBuf {
        self.ttp_dir().join(tactic.directory()).join("shell")
    }

    /// Unversioned script path for a procedure
    #[must_use]
    pub fn script_path(&self, procedure: &Procedure) -> PathBuf {
        self.output_dir(&procedure.tactic())
            .join(format!("{}.sh", procedure.name()))
    }

    /// Procedure YAML files in the config directory, sorted by name
    ///
    /// # Errors
    /// Returns error if the config directory cannot be listed
    pub fn procedure_files(&self) -> BuildResult<Vec<PathBuf>> {
        let dir = self.config_dir();
        let entries = std::fs::read_dir(&dir).map_err(|e| BuildError::io_error(&dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| BuildError::io_error(&dir, e))?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yml" || ext == "yaml");
            if is_yaml && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
