use crate::descriptor::FieldDescriptor;
use crate::error::{MergeFieldError, MergeFieldResult, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Source of field metadata. `relationship_path` is the dotted path that led to
/// `object_api_name`, `None` at the root.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn field_descriptors(
        &self,
        object_api_name: &str,
        relationship_path: Option<&str>,
    ) -> Result<Vec<FieldDescriptor>, ProviderError>;
}

/// Object api name to field descriptors, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub objects: BTreeMap<String, Vec<FieldDescriptor>>,
}

/// Serves descriptors from a schema held in memory (loaded from YAML or built in code).
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaProvider {
    schema: Schema,
}

impl InMemorySchemaProvider {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn from_yaml(yaml: &str) -> MergeFieldResult<Self> {
        let schema: Schema =
            serde_yaml::from_str(yaml).map_err(|e| MergeFieldError::Schema(e.to_string()))?;
        Ok(Self::new(schema))
    }

    pub fn load(path: impl AsRef<Path>) -> MergeFieldResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn with_object(mut self, object: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.schema.objects.insert(object.into(), fields);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[async_trait]
impl SchemaProvider for InMemorySchemaProvider {
    async fn field_descriptors(
        &self,
        object_api_name: &str,
        _relationship_path: Option<&str>,
    ) -> Result<Vec<FieldDescriptor>, ProviderError> {
        self.schema
            .objects
            .get(object_api_name)
            .cloned()
            .ok_or_else(|| ProviderError::new(format!("Unknown object '{}'", object_api_name)))
    }
}
