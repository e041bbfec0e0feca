//! Untyped procedure documents
//!
//! Converters build procedures by filling a template rather than the typed
//! model, so key order and unknown keys survive the round trip. Paths use
//! dot notation (`procedure.arguments`).

use crate::error::{ProcedureError, ProcedureResult};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// A procedure held as a raw YAML mapping
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDocument {
    root: Value,
}

impl Default for ProcedureDocument {
    fn default() -> Self {
        Self::new(Value::Mapping(Mapping::new()))
    }
}

impl ProcedureDocument {
    /// Wrap a YAML value
    #[inline]
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse YAML text attributed to `path`
    ///
    /// # Errors
    /// - `ProcedureError::Syntax` on malformed YAML
    /// - `ProcedureError::EmptyDocument` if the root is not a mapping
    pub fn parse(path: impl AsRef<Path>, text: &str) -> ProcedureResult<Self> {
        let path = path.as_ref();
        let root: Value = serde_yaml::from_str(text).map_err(|e| ProcedureError::from_yaml(path, &e))?;
        if !root.is_mapping() {
            return Err(ProcedureError::EmptyDocument {
                path: path.to_path_buf(),
            });
        }
        Ok(Self { root })
    }

    /// Read and parse a YAML file
    ///
    /// # Errors
    /// `ProcedureError::Io` plus any error from [`ProcedureDocument::parse`]
    pub fn load(path: impl AsRef<Path>) -> ProcedureResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ProcedureError::io_error(path, e))?;
        Self::parse(path, &text)
    }

    /// Root value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume into the root value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Get value at dot path
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            match current {
                Value::Mapping(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// String value at dot path
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    /// Set value at dot path, creating intermediate mappings
    ///
    /// Existing keys keep their position; new keys are appended.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            if !current.is_mapping() {
                *current = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(map) = current else {
                return;
            };
            current = map
                .entry(Value::String((*segment).to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }

        if !current.is_mapping() {
            *current = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(map) = current {
            map.insert(Value::String((*last).to_string()), value);
        }
    }

    /// Merge another document into this one, `other` wins
    pub fn merge(&mut self, other: &ProcedureDocument) {
        let base = std::mem::replace(&mut self.root, Value::Null);
        self.root = merge_values(base, other.root.clone());
    }

    /// Serialize to YAML text
    ///
    /// # Errors
    /// Returns `ProcedureError::Schema` if the value cannot be serialized
    pub fn to_yaml_string(&self) -> ProcedureResult<String> {
        serde_yaml::to_string(&self.root)
            .map_err(|e| ProcedureError::Schema(format!("cannot serialize document: {e}")))
    }
}

fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    let current = std::mem::replace(existing, Value::Null);
                    *existing = merge_values(current, value);
                } else {
                    base_map.insert(key, value);
                }
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r"
procedure_name: template
ttp_id: T1082
tactic: Discovery
guid: $GUID
procedure:
  arguments: []
";

    #[test]
    fn get_nested_path() {
        let doc = ProcedureDocument::parse("t.yml", TEMPLATE).unwrap();
        assert_eq!(doc.get_str("ttp_id"), Some("T1082"));
        assert!(doc.get_path("procedure.arguments").unwrap().is_sequence());
        assert_eq!(doc.get_path("procedure.missing"), None);
        assert_eq!(doc.get_path("ttp_id.deeper"), None);
    }

    #[test]
    fn set_path_preserves_key_order() {
        let mut doc = ProcedureDocument::parse("t.yml", TEMPLATE).unwrap();
        doc.set_path("procedure_name", Value::String("curl".into()));
        doc.set_path("procedure.functions", Value::Sequence(vec![]));
        doc.set_path("resources", Value::Sequence(vec![]));

        let keys: Vec<_> = doc
            .root()
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["procedure_name", "ttp_id", "tactic", "guid", "procedure", "resources"]);
        assert_eq!(doc.get_str("procedure_name"), Some("curl"));
        assert!(doc.get_path("procedure.functions").is_some());
    }

    #[test]
    fn set_path_replaces_scalars_on_the_way() {
        let mut doc = ProcedureDocument::default();
        doc.set_path("a", Value::String("x".into()));
        doc.set_path("a.b", Value::Bool(true));
        assert_eq!(doc.get_path("a.b"), Some(&Value::Bool(true)));
    }

    #[test]
    fn merge_overlays_nested_values() {
        let mut base = ProcedureDocument::parse("a.yml", "x: 1\nnested:\n  keep: true\n  over: 1\n").unwrap();
        let overlay = ProcedureDocument::parse("b.yml", "nested:\n  over: 2\ny: 3\n").unwrap();
        base.merge(&overlay);

        assert_eq!(base.get_path("nested.keep"), Some(&Value::Bool(true)));
        assert_eq!(base.get_path("nested.over"), Some(&Value::Number(2.into())));
        assert_eq!(base.get_path("y"), Some(&Value::Number(3.into())));
    }

    #[test]
    fn non_mapping_rejected() {
        assert!(matches!(
            ProcedureDocument::parse("l.yml", "- a\n- b\n"),
            Err(ProcedureError::EmptyDocument { .. })
        ));
    }
}
