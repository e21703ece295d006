use crate::error::{MergeFieldError, MergeFieldResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ROOT_OBJECT_ENV: &str = "MERGEFIELD_ROOT_OBJECT";
pub const AGGREGATE_PREFIX_ENV: &str = "MERGEFIELD_AGGREGATE_PREFIX";

/// Settings shared by the navigator, the editor and the CLI. Every key is optional in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Object the merge-field wizard opens on.
    pub root_object: String,
    pub id_field: String,
    pub body_field: String,
    /// Api-name prefix of the legacy aggregate descriptor encoding (`table:<alias>`).
    pub aggregate_prefix: String,
    /// Row written inside a generated `{!tableStart:..}` block.
    pub aggregate_row_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_object: "TREX1__Contract_and_Form__c".to_string(),
            id_field: "Id".to_string(),
            body_field: "TREX1__Waiver_Text__c".to_string(),
            aggregate_prefix: "table:".to_string(),
            aggregate_row_template: "{!Name} - {!Price__c}".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> MergeFieldResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| MergeFieldError::Config(e.to_string()))
    }

    /// Read a YAML config file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> MergeFieldResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            MergeFieldError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::from_yaml(&yaml)?.with_env())
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(root) = lookup(ROOT_OBJECT_ENV) {
            self.root_object = root;
        }
        if let Some(prefix) = lookup(AGGREGATE_PREFIX_ENV) {
            self.aggregate_prefix = prefix;
        }
        self
    }
}
