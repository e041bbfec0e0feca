//! LOOBins catalog entries

use crate::error::{ConvertError, ConvertResult};
use serde::Deserialize;
use std::path::Path;

/// One LOOBins binary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoobinEntry {
    /// Binary name, e.g. `Networksetup`
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub example_use_cases: Vec<UseCase>,
    #[serde(default)]
    pub resources: Option<Vec<LoobinResource>>,
    #[serde(default)]
    pub detections: Option<Vec<LoobinDetection>>,
}

/// Example invocation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UseCase {
    pub name: String,
    pub description: String,
    pub code: String,
}

/// External reference
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoobinResource {
    pub name: String,
    pub url: String,
}

/// Known detection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoobinDetection {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl LoobinEntry {
    /// Parse entry text attributed to `path`
    ///
    /// # Errors
    /// Returns `ConvertError::Entry` on malformed YAML or missing fields
    pub fn parse(path: impl AsRef<Path>, text: &str) -> ConvertResult<Self> {
        serde_yaml::from_str(text).map_err(|source| ConvertError::Entry {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Read and parse an entry file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io_error(path, e))?;
        Self::parse(path, &text)
    }

    /// First install path, `/usr/bin/<name>` when none is listed
    #[must_use]
    pub fn binary_path(&self) -> String {
        self.paths
            .as_ref()
            .and_then(|paths| paths.first().cloned())
            .unwrap_or_else(|| format!("/usr/bin/{}", self.name))
    }
}

impl UseCase {
    /// Option for this use case: `Enable a web proxy` -> `--enable-a-web-proxy`
    #[must_use]
    pub fn option(&self) -> String {
        format!("--{}", self.name.to_lowercase().replace(' ', "-"))
    }

    /// Function for this use case: `execute_enable_a_web_proxy`
    #[must_use]
    pub fn function_name(&self) -> String {
        format!("execute_{}", self.name.to_lowercase().replace(' ', "_"))
    }
}
