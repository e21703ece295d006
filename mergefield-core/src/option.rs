use crate::config::Config;
use crate::descriptor::{DescriptorKind, FieldDescriptor};
use mergefield_text::{merge_field, qualify, table_block};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A selectable entry in the field picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldOption {
    /// Inserts `{!<path>}`.
    Terminal { label: String, value: String },
    /// Navigates into the related object; its value is `full_path`.
    Relationship {
        label: String,
        relationship_name: String,
        base_object: String,
        full_path: String,
        target_object_api_name: String,
    },
    /// Inserts a `{!tableStart:<alias>}...{!tableEnd}` block.
    Aggregate {
        label: String,
        alias: String,
        value: String,
    },
}

impl FieldOption {
    pub fn label(&self) -> &str {
        match self {
            FieldOption::Terminal { label, .. }
            | FieldOption::Relationship { label, .. }
            | FieldOption::Aggregate { label, .. } => label,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldOption::Terminal { value, .. } | FieldOption::Aggregate { value, .. } => value,
            FieldOption::Relationship { full_path, .. } => full_path,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, FieldOption::Relationship { .. })
    }
}

/// Build the option list for one object at `current_path`.
///
/// A relationship contributes its foreign-key field as a Terminal option and a Relationship
/// option extending `current_path`; every other field contributes one option. Descriptors
/// that fail classification are skipped. The list is sorted by label, case-insensitively,
/// keeping provider order on ties.
pub fn build_options(
    object_api_name: &str,
    current_path: &str,
    descriptors: &[FieldDescriptor],
    config: &Config,
) -> Vec<FieldOption> {
    let mut options = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let kind = match descriptor.kind(&config.aggregate_prefix) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(object = object_api_name, error = %err, "skipping field descriptor");
                continue;
            }
        };
        let terminal = || FieldOption::Terminal {
            label: descriptor.label.clone(),
            value: merge_field(&qualify(current_path, &descriptor.api_name)),
        };

        match kind {
            DescriptorKind::Field => options.push(terminal()),
            DescriptorKind::Relationship {
                relationship_name,
                target_object,
            } => {
                options.push(terminal());
                options.push(FieldOption::Relationship {
                    label: descriptor.label.clone(),
                    relationship_name: relationship_name.to_string(),
                    base_object: object_api_name.to_string(),
                    full_path: qualify(current_path, relationship_name),
                    target_object_api_name: target_object.to_string(),
                });
            }
            DescriptorKind::Aggregate { alias } => options.push(FieldOption::Aggregate {
                label: descriptor.label.clone(),
                alias: alias.to_string(),
                value: table_block(alias, &config.aggregate_row_template),
            }),
        }
    }

    // sort_by_cached_key is stable
    options.sort_by_cached_key(|option| option.label().to_lowercase());
    options
}
