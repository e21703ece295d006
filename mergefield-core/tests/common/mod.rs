#![allow(dead_code)]

use async_trait::async_trait;
use mergefield_core::{
    ClipboardSink, FieldDescriptor, InMemorySchemaProvider, MergeFieldError, MergeFieldResult,
    ModalHost, ModalOutcome, ProviderError, RecordSnapshot, RecordStore, Reporter,
    SchemaProvider, Severity,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn fixture_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(filename);
    path
}

pub fn read_fixture(filename: &str) -> String {
    std::fs::read_to_string(fixture_path(filename)).unwrap()
}

// --- Schema provider ---

/// Wraps the fixture schema with call recording, per-object delays and switchable failure.
pub struct ScriptedProvider {
    inner: InMemorySchemaProvider,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    delays: HashMap<String, Duration>,
    failing: AtomicBool,
}

impl ScriptedProvider {
    pub fn fixture() -> Self {
        Self::new(InMemorySchemaProvider::load(fixture_path("schema.yaml")).unwrap())
    }

    pub fn new(inner: InMemorySchemaProvider) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            delays: HashMap::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_delay(mut self, object: &str, delay: Duration) -> Self {
        self.delays.insert(object.to_string(), delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaProvider for ScriptedProvider {
    async fn field_descriptors(
        &self,
        object_api_name: &str,
        relationship_path: Option<&str>,
    ) -> Result<Vec<FieldDescriptor>, ProviderError> {
        self.calls.lock().unwrap().push((
            object_api_name.to_string(),
            relationship_path.map(str::to_string),
        ));
        if let Some(delay) = self.delays.get(object_api_name) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::from_messages([
                "INSUFFICIENT_ACCESS",
                "Field metadata unavailable",
            ]));
        }
        self.inner
            .field_descriptors(object_api_name, relationship_path)
            .await
    }
}

// --- Reporter ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Error {
        context: String,
        error: String,
        user_message: String,
    },
    Notice {
        title: String,
        message: String,
        severity: Severity,
    },
}

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Report> {
        self.reports()
            .into_iter()
            .filter(|r| matches!(r, Report::Error { .. }))
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report_error(&self, context: &str, error: &MergeFieldError, user_message: &str) {
        self.reports.lock().unwrap().push(Report::Error {
            context: context.to_string(),
            error: error.to_string(),
            user_message: user_message.to_string(),
        });
    }

    fn notify(&self, title: &str, message: &str, severity: Severity) {
        self.reports.lock().unwrap().push(Report::Notice {
            title: title.to_string(),
            message: message.to_string(),
            severity,
        });
    }
}

// --- Record store ---

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, Map<String, Value>>>,
    pub fail_reads: AtomicBool,
    pub fail_updates: AtomicBool,
    pub reads: AtomicUsize,
    pub updates: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn with_record(self, id: &str, field: &str, value: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(field.to_string(), Value::String(value.to_string()));
        self.records.lock().unwrap().insert(id.to_string(), fields);
        self
    }

    pub fn field(&self, id: &str, field: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(id)
            .and_then(|f| f.get(field))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_record(
        &self,
        record_id: &str,
        fields: &[&str],
    ) -> Result<RecordSnapshot, ProviderError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProviderError::new("Record not available"));
        }
        let records = self.records.lock().unwrap();
        let stored = records
            .get(record_id)
            .ok_or_else(|| ProviderError::new(format!("No record {}", record_id)))?;
        let mut snapshot = RecordSnapshot::new(record_id);
        for field in fields {
            if let Some(value) = stored.get(*field) {
                snapshot.fields.insert(field.to_string(), value.clone());
            }
        }
        Ok(snapshot)
    }

    async fn update_record(&self, fields: Map<String, Value>) -> Result<(), ProviderError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ProviderError::from_messages(["ENTITY_IS_LOCKED"]));
        }
        let id = fields
            .get("Id")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::new("Missing Id"))?
            .to_string();
        let mut records = self.records.lock().unwrap();
        let record = records.entry(id).or_default();
        for (name, value) in fields {
            if name != "Id" {
                record.insert(name, value);
            }
        }
        Ok(())
    }
}

// --- Modal host ---

pub struct ScriptedHost {
    pub outcome: ModalOutcome<String>,
    pub opened_with: Mutex<Vec<String>>,
}

impl ScriptedHost {
    pub fn new(outcome: ModalOutcome<String>) -> Self {
        Self {
            outcome,
            opened_with: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModalHost for ScriptedHost {
    async fn open_merge_field_modal(&self, root_object: &str) -> ModalOutcome<String> {
        self.opened_with.lock().unwrap().push(root_object.to_string());
        self.outcome.clone()
    }
}

// --- Clipboard ---

#[derive(Default)]
pub struct RecordingClipboard {
    pub writes: Mutex<Vec<String>>,
}

impl ClipboardSink for RecordingClipboard {
    fn write_text(&self, text: &str) -> MergeFieldResult<()> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct UnavailableClipboard;

impl ClipboardSink for UnavailableClipboard {
    fn write_text(&self, _text: &str) -> MergeFieldResult<()> {
        Err(MergeFieldError::ClipboardUnavailable)
    }
}

pub struct FailingClipboard(pub String);

impl ClipboardSink for FailingClipboard {
    fn write_text(&self, _text: &str) -> MergeFieldResult<()> {
        Err(MergeFieldError::Clipboard(self.0.clone()))
    }
}
