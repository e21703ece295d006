use crate::error::{MergeFieldError, MergeFieldResult};
use serde::{Deserialize, Serialize};

/// Metadata for one field of an object, as returned by the schema provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub api_name: String,
    pub label: String,
    #[serde(default)]
    pub is_relationship: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_object_api_name: Option<String>,
    /// Explicit aggregate (related-list table) alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_alias: Option<String>,
}

/// What a descriptor turns into once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind<'a> {
    Field,
    Relationship {
        relationship_name: &'a str,
        target_object: &'a str,
    },
    Aggregate {
        alias: &'a str,
    },
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl FieldDescriptor {
    pub fn field(api_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            label: label.into(),
            is_relationship: false,
            relationship_name: None,
            target_object_api_name: None,
            aggregate_alias: None,
        }
    }

    pub fn relationship(
        api_name: impl Into<String>,
        label: impl Into<String>,
        relationship_name: impl Into<String>,
        target_object: impl Into<String>,
    ) -> Self {
        Self {
            is_relationship: true,
            relationship_name: Some(relationship_name.into()),
            target_object_api_name: Some(target_object.into()),
            ..Self::field(api_name, label)
        }
    }

    pub fn aggregate(alias: impl Into<String>, label: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            aggregate_alias: Some(alias.clone()),
            ..Self::field(alias, label)
        }
    }

    /// Classify the descriptor. `aggregate_prefix` recognizes the legacy `table:<alias>`
    /// api-name encoding; an explicit `aggregateAlias` wins over it.
    pub fn kind(&self, aggregate_prefix: &str) -> MergeFieldResult<DescriptorKind<'_>> {
        if let Some(alias) = non_empty(self.aggregate_alias.as_ref()) {
            return Ok(DescriptorKind::Aggregate { alias });
        }
        if !aggregate_prefix.is_empty() {
            if let Some(alias) = self.api_name.strip_prefix(aggregate_prefix) {
                let alias = alias.trim();
                if alias.is_empty() {
                    return Err(self.invalid("aggregate alias is empty"));
                }
                return Ok(DescriptorKind::Aggregate { alias });
            }
        }
        if !self.is_relationship {
            return Ok(DescriptorKind::Field);
        }

        let relationship_name = non_empty(self.relationship_name.as_ref())
            .ok_or_else(|| self.invalid("relationship without relationshipName"))?;
        let target_object = non_empty(self.target_object_api_name.as_ref())
            .ok_or_else(|| self.invalid("relationship without targetObjectApiName"))?;
        Ok(DescriptorKind::Relationship {
            relationship_name,
            target_object,
        })
    }

    fn invalid(&self, reason: &str) -> MergeFieldError {
        MergeFieldError::InvalidDescriptor {
            api_name: self.api_name.clone(),
            reason: reason.to_string(),
        }
    }
}
