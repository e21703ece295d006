use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field values of one record as last read from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RecordSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// String value of `name`; `None` when absent, null or not a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// The snapshot as a JSON object, for template preview.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Record persistence. Reads go through the platform cache; calling `get_record` again after
/// an update is the cache refresh.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_record(
        &self,
        record_id: &str,
        fields: &[&str],
    ) -> Result<RecordSnapshot, ProviderError>;

    /// `fields` carries the id field plus every field being written.
    async fn update_record(&self, fields: Map<String, Value>) -> Result<(), ProviderError>;
}
