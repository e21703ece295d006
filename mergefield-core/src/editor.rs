//! Template-body editing for one template record: load, dirty-check, merge-field insertion and save.

use crate::config::Config;
use crate::error::MergeFieldError;
use crate::record::{RecordSnapshot, RecordStore};
use crate::reporter::{Reporter, Severity};
use crate::wizard::ModalHost;
use mergefield_text::{normalize_html, unescape_allowed_html};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CONTEXT: &str = "TemplateEditor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NoChanges,
    /// The store rejected the update; edits are kept for a manual retry.
    Failed,
}

pub struct TemplateEditor {
    record_id: String,
    config: Config,
    store: Arc<dyn RecordStore>,
    reporter: Arc<dyn Reporter>,
    snapshot: Option<RecordSnapshot>,
    original_body: String,
    body: String,
    /// Byte offset of the insertion point; `None` appends.
    cursor: Option<usize>,
}

impl TemplateEditor {
    pub fn new(
        record_id: impl Into<String>,
        config: Config,
        store: Arc<dyn RecordStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            config,
            store,
            reporter,
            snapshot: None,
            original_body: String::new(),
            body: String::new(),
            cursor: None,
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn original_body(&self) -> &str {
        &self.original_body
    }

    pub fn snapshot(&self) -> Option<&RecordSnapshot> {
        self.snapshot.as_ref()
    }

    /// Read the template body from the store. Both the saved and the working copy are replaced.
    pub async fn load(&mut self) -> bool {
        match self.fetch().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "template load failed");
                self.reporter
                    .report_error(CONTEXT, &err, "Error retrieving waiver text");
                false
            }
        }
    }

    async fn fetch(&mut self) -> Result<(), MergeFieldError> {
        let fields = [self.config.body_field.as_str()];
        let snapshot = self
            .store
            .get_record(&self.record_id, &fields)
            .await
            .map_err(|source| MergeFieldError::RecordLoad {
                record_id: self.record_id.clone(),
                source,
            })?;
        let body = snapshot
            .field_str(&self.config.body_field)
            .unwrap_or_default()
            .to_string();
        debug!(record = %self.record_id, bytes = body.len(), "template loaded");
        self.original_body = body.clone();
        self.body = body;
        self.cursor = None;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Mirror an editor change event.
    pub fn set_body(&mut self, value: impl Into<String>) {
        self.body = value.into();
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = Some(offset);
    }

    /// True when the working body differs from the saved one once formatting noise is ignored.
    pub fn has_changes(&self) -> bool {
        normalize_html(&self.body) != normalize_html(&self.original_body)
    }

    /// Insert merge text at the cursor, then re-enable allowed formatting tags in the body.
    pub fn insert_merge_text(&mut self, text: &str) {
        let mut at = self.cursor.unwrap_or(self.body.len()).min(self.body.len());
        while !self.body.is_char_boundary(at) {
            at -= 1;
        }
        self.body.insert_str(at, text);
        self.cursor = Some(at + text.len());
        self.body = unescape_allowed_html(&self.body);
    }

    /// Ask the host for a merge expression and insert it. Returns whether anything was inserted.
    pub async fn open_merge_field_wizard(&mut self, host: &dyn ModalHost) -> bool {
        let outcome = host.open_merge_field_modal(&self.config.root_object).await;
        match outcome.into_option() {
            Some(text) if !text.is_empty() => {
                self.insert_merge_text(&text);
                true
            }
            _ => false,
        }
    }

    /// Persist the body when it changed. On success the snapshot is re-read from the store.
    pub async fn save(&mut self) -> SaveOutcome {
        if !self.has_changes() {
            self.reporter
                .notify("No Updates", "There are no changes to save", Severity::Info);
            return SaveOutcome::NoChanges;
        }

        let mut fields = Map::new();
        fields.insert(
            self.config.id_field.clone(),
            Value::String(self.record_id.clone()),
        );
        fields.insert(
            self.config.body_field.clone(),
            Value::String(self.body.clone()),
        );

        match self.store.update_record(fields).await {
            Ok(()) => {
                info!(record = %self.record_id, "template body updated");
                self.reporter.notify(
                    "Success",
                    "The template's Waiver Text has been updated",
                    Severity::Success,
                );
                let saved = self.body.clone();
                if let Err(err) = self.fetch().await {
                    warn!(error = %err, "reload after save failed; keeping saved body");
                    self.original_body = saved;
                }
                SaveOutcome::Saved
            }
            Err(source) => {
                let err = MergeFieldError::Persistence {
                    record_id: self.record_id.clone(),
                    source,
                };
                warn!(error = %err, "template save failed");
                self.reporter
                    .report_error(CONTEXT, &err, "Error updating waiver text");
                SaveOutcome::Failed
            }
        }
    }
}
