// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named spec constants with expression support and YAML presets.

use crate::error::SpecError;
use crate::spec::{Expr, SpecResolver};
use dashmap::DashMap;
use std::collections::HashMap;

/// Preset values keyed by name.
///
/// Resolved expressions are memoised per instance; mutating the value set
/// drops the memo.
#[derive(Debug, Default)]
pub struct SpecValues {
    values: HashMap<String, u64>,
    resolved: DashMap<String, Option<u64>>,
}

impl SpecValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: u64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u64) {
        self.values.insert(name.into(), value);
        self.resolved.clear();
    }

    /// Copy every value of `other`, overriding existing names.
    pub fn merge(&mut self, other: &SpecValues) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), *value);
        }
        self.resolved.clear();
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load a flat `NAME: value` YAML mapping.
    ///
    /// Integers and decimal or `0x` numeric strings are accepted; other
    /// entries (fork versions, addresses) are skipped.
    #[cfg(feature = "presets")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SpecError> {
        crate::trace_fn!("SpecValues::from_yaml_str");
        let mut specs = Self::new();
        if yaml.trim().is_empty() {
            return Ok(specs);
        }

        let doc: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| SpecError::Yaml(e.to_string()))?;
        let mapping = match doc {
            serde_yaml::Value::Mapping(m) => m,
            serde_yaml::Value::Null => return Ok(specs),
            _ => return Err(SpecError::Yaml("expected a mapping of NAME: value".to_string())),
        };

        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                log::debug!("[dynssz] skipping non-string preset key {:?}", key);
                continue;
            };
            match preset_number(&value) {
                Some(number) => {
                    specs.values.insert(name.to_string(), number);
                }
                None => log::debug!("[dynssz] skipping non-numeric preset value {}", name),
            }
        }

        log::debug!("[dynssz] loaded {} preset values", specs.len());
        Ok(specs)
    }

    /// Load a preset file.
    #[cfg(feature = "presets")]
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, SpecError> {
        crate::trace_fn!("SpecValues::from_yaml_file");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(feature = "presets")]
fn preset_number(value: &serde_yaml::Value) -> Option<u64> {
    match value {
        serde_yaml::Value::Number(n) => n.as_u64(),
        serde_yaml::Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                // Hex strings wider than u64 are byte blobs, not numbers.
                Some(hex) if hex.len() <= 16 => u64::from_str_radix(hex, 16).ok(),
                Some(_) => None,
                None => s.parse::<u64>().ok(),
            }
        }
        _ => None,
    }
}

impl FromIterator<(String, u64)> for SpecValues {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            resolved: DashMap::new(),
        }
    }
}

impl SpecResolver for SpecValues {
    fn resolve(&self, name: &str) -> Result<Option<u64>, SpecError> {
        if let Some(value) = self.values.get(name) {
            return Ok(Some(*value));
        }
        if let Some(cached) = self.resolved.get(name) {
            return Ok(*cached);
        }

        let expr = Expr::parse(name)?;
        let value = expr.eval(name, &mut |n| self.values.get(n).copied())?;
        self.resolved.insert(name.to_string(), value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_and_expression_lookup() {
        let specs = SpecValues::new().with("A", 10).with("B", 4);
        assert_eq!(specs.resolve("A").unwrap(), Some(10));
        assert_eq!(specs.resolve("A/B").unwrap(), Some(3));
        assert_eq!(specs.resolve("A*C").unwrap(), None);
        assert!(specs.resolve("A +").is_err());
    }

    #[test]
    fn test_insert_invalidates_memo() {
        let mut specs = SpecValues::new().with("A", 2);
        assert_eq!(specs.resolve("A*2").unwrap(), Some(4));
        specs.insert("A", 5);
        assert_eq!(specs.resolve("A*2").unwrap(), Some(10));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = SpecValues::new().with("A", 1).with("B", 2);
        let overlay: SpecValues = vec![("B".to_string(), 20)].into_iter().collect();
        base.merge(&overlay);
        assert_eq!(base.get("A"), Some(1));
        assert_eq!(base.get("B"), Some(20));
    }

    #[cfg(feature = "presets")]
    #[test]
    fn test_yaml_preset() {
        let yaml = r#"
PRESET_BASE: 'minimal'
SLOTS_PER_EPOCH: 8
MAX_COMMITTEES_PER_SLOT: "4"
GENESIS_FORK_VERSION: 0x00000001
DEPOSIT_CONTRACT_ADDRESS: 0x1234567890123456789012345678901234567890
"#;
        let specs = SpecValues::from_yaml_str(yaml).unwrap();
        assert_eq!(specs.get("SLOTS_PER_EPOCH"), Some(8));
        assert_eq!(specs.get("MAX_COMMITTEES_PER_SLOT"), Some(4));
        assert_eq!(specs.get("PRESET_BASE"), None);
        assert_eq!(specs.get("DEPOSIT_CONTRACT_ADDRESS"), None);
    }

    #[cfg(feature = "presets")]
    #[test]
    fn test_yaml_rejects_sequences() {
        assert!(matches!(
            SpecValues::from_yaml_str("- 1\n- 2\n"),
            Err(SpecError::Yaml(_))
        ));
        assert!(SpecValues::from_yaml_str("").unwrap().is_empty());
    }
}
