//! Merge-field wizard sessions and the modal contract around them.

use crate::config::Config;
use crate::error::{MergeFieldError, MergeFieldResult};
use crate::navigator::{PathNavigator, Refresh};
use crate::provider::SchemaProvider;
use crate::reporter::Reporter;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// What a modal resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome<T> {
    Selected(T),
    Cancelled,
}

impl<T> ModalOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            ModalOutcome::Selected(value) => Some(value),
            ModalOutcome::Cancelled => None,
        }
    }
}

/// Host shell that shows the merge-field modal and resolves it once.
#[async_trait]
pub trait ModalHost: Send + Sync {
    async fn open_merge_field_modal(&self, root_object: &str) -> ModalOutcome<String>;
}

/// One open merge-field picker: the navigator plus the fallback-literal input.
pub struct MergeFieldWizard {
    navigator: PathNavigator,
    fallback: Mutex<String>,
}

impl MergeFieldWizard {
    pub fn new(navigator: PathNavigator) -> Self {
        Self {
            navigator,
            fallback: Mutex::new(String::new()),
        }
    }

    pub fn navigator(&self) -> &PathNavigator {
        &self.navigator
    }

    pub fn set_fallback(&self, literal: impl Into<String>) {
        *self.fallback.lock().unwrap_or_else(PoisonError::into_inner) = literal.into();
    }

    pub fn fallback(&self) -> String {
        self.fallback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Insert is enabled only for a Terminal or Aggregate selection.
    pub fn can_insert(&self) -> bool {
        self.navigator.merge_expression(None).is_some()
    }

    /// Resolve with the finished merge expression, or `None` while insert is disabled.
    pub fn insert(&self) -> Option<ModalOutcome<String>> {
        let fallback = self.fallback();
        let fallback = (!fallback.is_empty()).then_some(fallback.as_str());
        self.navigator
            .merge_expression(fallback)
            .map(ModalOutcome::Selected)
    }

    pub fn cancel(&self) -> ModalOutcome<String> {
        ModalOutcome::Cancelled
    }
}

/// Open wizards keyed by session id. A session lives from modal open to modal close.
pub struct WizardSessions {
    provider: Arc<dyn SchemaProvider>,
    reporter: Arc<dyn Reporter>,
    config: Config,
    sessions: DashMap<String, Arc<MergeFieldWizard>>,
}

impl WizardSessions {
    pub fn new(
        provider: Arc<dyn SchemaProvider>,
        reporter: Arc<dyn Reporter>,
        config: Config,
    ) -> Self {
        Self {
            provider,
            reporter,
            config,
            sessions: DashMap::new(),
        }
    }

    /// Create a wizard, register it and open its navigator on `root_object`
    /// (the configured root when `None`).
    pub async fn open(&self, root_object: Option<&str>) -> (String, Refresh) {
        let id = Uuid::new_v4().to_string();
        let navigator = PathNavigator::new(
            self.provider.clone(),
            self.reporter.clone(),
            self.config.clone(),
        );
        let wizard = Arc::new(MergeFieldWizard::new(navigator));
        self.sessions.insert(id.clone(), wizard.clone());

        let root = root_object.unwrap_or(self.config.root_object.as_str());
        info!(session = %id, root, "merge field wizard opened");
        let refresh = wizard.navigator().open(root).await;
        (id, refresh)
    }

    pub fn get(&self, id: &str) -> MergeFieldResult<Arc<MergeFieldWizard>> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MergeFieldError::SessionNotFound { id: id.to_string() })
    }

    /// Resolve the session with its merge expression and discard it. While insert is
    /// disabled the session stays open and `None` is returned.
    pub fn insert(&self, id: &str) -> MergeFieldResult<Option<ModalOutcome<String>>> {
        let outcome = self.get(id)?.insert();
        if outcome.is_some() {
            self.close(id);
        }
        Ok(outcome)
    }

    /// Resolve the session as cancelled and discard it.
    pub fn cancel(&self, id: &str) -> MergeFieldResult<ModalOutcome<String>> {
        let outcome = self.get(id)?.cancel();
        self.close(id);
        Ok(outcome)
    }

    pub fn close(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            debug!(session = id, "merge field wizard closed");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
