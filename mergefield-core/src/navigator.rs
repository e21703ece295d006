//! Relationship-path navigator behind the merge-field wizard.
//!
//! The navigator browses one object at a time. Selecting a relationship descends into the
//! related object and pushes a breadcrumb; `back` pops it and restores the exact prior
//! position. Terminal selections are recorded and turned into a merge expression on demand.
//!
//! State lives in a `tokio::sync::watch` channel: every mutation publishes a snapshot to
//! subscribers, and the channel's lock is never held across an await.

use crate::config::Config;
use crate::error::MergeFieldError;
use crate::option::{build_options, FieldOption};
use crate::provider::SchemaProvider;
use crate::reporter::Reporter;
use mergefield_text::build_merge_expression;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const CONTEXT: &str = "PathNavigator";
const FETCH_ERROR_MESSAGE: &str = "Error retrieving fields";

/// Navigation position saved before a descent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbEntry {
    pub object_api_name: String,
    pub relationship_path: String,
    /// Label of the relationship that was followed.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigatorState {
    pub current_object_api_name: String,
    pub current_path: String,
    pub options: Vec<FieldOption>,
    pub breadcrumbs: Vec<BreadcrumbEntry>,
    pub selected_value: Option<String>,
}

impl NavigatorState {
    pub fn is_at_root(&self) -> bool {
        self.breadcrumbs.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.breadcrumbs.len()
    }

    pub fn find_option(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value() == value)
    }

    pub fn selected_option(&self) -> Option<&FieldOption> {
        self.selected_value
            .as_deref()
            .and_then(|value| self.find_option(value))
    }
}

/// Everything in a [`NavigatorState`] except the options.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Position {
    object: String,
    path: String,
    breadcrumbs: Vec<BreadcrumbEntry>,
    selected_value: Option<String>,
}

impl Position {
    fn of(state: &NavigatorState) -> Self {
        Self {
            object: state.current_object_api_name.clone(),
            path: state.current_path.clone(),
            breadcrumbs: state.breadcrumbs.clone(),
            selected_value: state.selected_value.clone(),
        }
    }

    fn same_place(&self, other: &Position) -> bool {
        self.object == other.object
            && self.path == other.path
            && self.breadcrumbs == other.breadcrumbs
    }

    fn restore(self, state: &mut NavigatorState, keep_selection: bool) {
        state.current_object_api_name = self.object;
        state.current_path = self.path;
        state.breadcrumbs = self.breadcrumbs;
        if !keep_selection {
            state.selected_value = self.selected_value;
        }
    }
}

/// Result of an operation that may refresh the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// New options were applied.
    Applied,
    /// A newer refresh was issued while this one was in flight; its response was dropped.
    Superseded,
    /// The provider failed; the error was reported, the old options kept and any move undone.
    Failed,
    /// Nothing was requested.
    Unchanged,
}

pub struct PathNavigator {
    provider: Arc<dyn SchemaProvider>,
    reporter: Arc<dyn Reporter>,
    config: Config,
    state: watch::Sender<NavigatorState>,
    /// Ticket of the most recently issued refresh.
    latest_ticket: AtomicU64,
}

impl PathNavigator {
    pub fn new(
        provider: Arc<dyn SchemaProvider>,
        reporter: Arc<dyn Reporter>,
        config: Config,
    ) -> Self {
        let (state, _) = watch::channel(NavigatorState::default());
        Self {
            provider,
            reporter,
            config,
            state,
            latest_ticket: AtomicU64::new(0),
        }
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<NavigatorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> NavigatorState {
        self.state.borrow().clone()
    }

    pub fn is_at_root(&self) -> bool {
        self.state.borrow().is_at_root()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start browsing at `root_object_api_name` with no path, no breadcrumbs and no options.
    pub async fn open(&self, root_object_api_name: &str) -> Refresh {
        info!(root = root_object_api_name, "opening navigator");
        self.state.send_replace(NavigatorState {
            current_object_api_name: root_object_api_name.to_string(),
            ..NavigatorState::default()
        });
        self.refresh().await
    }

    /// Fetch descriptors for the current position and rebuild the option list.
    pub async fn refresh(&self) -> Refresh {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let (object, path) = {
            let state = self.state.borrow();
            (
                state.current_object_api_name.clone(),
                state.current_path.clone(),
            )
        };
        let relationship_path = (!path.is_empty()).then_some(path.as_str());
        debug!(ticket, object = %object, path = %path, "requesting field descriptors");

        let result = self
            .provider
            .field_descriptors(&object, relationship_path)
            .await;

        if self.latest_ticket.load(Ordering::SeqCst) != ticket {
            debug!(ticket, object = %object, "dropping superseded descriptor response");
            return Refresh::Superseded;
        }

        match result {
            Ok(descriptors) => {
                let options = build_options(&object, &path, &descriptors, &self.config);
                let applied = self.state.send_if_modified(|state| {
                    if state.current_object_api_name != object || state.current_path != path {
                        return false;
                    }
                    state.options = options;
                    true
                });
                if applied {
                    Refresh::Applied
                } else {
                    debug!(ticket, object = %object, "position moved; dropping response");
                    Refresh::Superseded
                }
            }
            Err(source) => {
                let err = MergeFieldError::DescriptorFetch { object, source };
                warn!(error = %err, "descriptor fetch failed");
                self.reporter
                    .report_error(CONTEXT, &err, FETCH_ERROR_MESSAGE);
                Refresh::Failed
            }
        }
    }

    /// Select the option whose value is `value`.
    ///
    /// A Relationship option descends into its target object and refreshes. Any other option
    /// becomes the current selection. An unknown value is ignored. When the refresh fails the
    /// descent is undone, so the kept options still match the position.
    pub async fn select_option(&self, value: &str) -> Refresh {
        let mut before = None;
        let mut matched = false;
        self.state.send_if_modified(|state| {
            let Some(option) = state.find_option(value).cloned() else {
                return false;
            };
            matched = true;
            match option {
                FieldOption::Relationship {
                    label,
                    full_path,
                    target_object_api_name,
                    ..
                } => {
                    before = Some(Position::of(state));
                    let entry = BreadcrumbEntry {
                        object_api_name: std::mem::replace(
                            &mut state.current_object_api_name,
                            target_object_api_name,
                        ),
                        relationship_path: std::mem::replace(&mut state.current_path, full_path),
                        label,
                    };
                    state.breadcrumbs.push(entry);
                    state.selected_value = None;
                }
                _ => state.selected_value = Some(value.to_string()),
            }
            true
        });

        if !matched {
            debug!(value, "no option matches selection");
            return Refresh::Unchanged;
        }
        let Some(before) = before else {
            return Refresh::Unchanged;
        };

        let after = Position::of(&self.state.borrow());
        info!(object = %after.object, depth = after.breadcrumbs.len(), "descended into relationship");
        self.refresh_or_restore(before, after).await
    }

    /// Return to the position saved by the most recent descent. The relationship that was
    /// collapsed becomes the pending selection. When the refresh fails the navigator stays
    /// where it was.
    pub async fn back(&self) -> Refresh {
        let mut before = None;
        self.state.send_if_modified(|state| {
            let snapshot = Position::of(state);
            let Some(entry) = state.breadcrumbs.pop() else {
                return false;
            };
            let collapsed = std::mem::replace(&mut state.current_path, entry.relationship_path);
            state.current_object_api_name = entry.object_api_name;
            state.selected_value = Some(collapsed);
            before = Some(snapshot);
            true
        });

        let Some(before) = before else {
            debug!("back at root ignored");
            return Refresh::Unchanged;
        };
        let after = Position::of(&self.state.borrow());
        debug!(depth = after.breadcrumbs.len(), "navigated back");
        self.refresh_or_restore(before, after).await
    }

    /// Refresh after a move from `before` to `after`; on failure put `before` back.
    ///
    /// A failed refresh held the latest ticket, and nothing awaits between its return and the
    /// restore, so a superseded request never undoes a newer move. A selection made while the
    /// request was in flight is kept.
    async fn refresh_or_restore(&self, before: Position, after: Position) -> Refresh {
        let outcome = self.refresh().await;
        if outcome != Refresh::Failed {
            return outcome;
        }
        let restored = self.state.send_if_modified(|state| {
            let current = Position::of(state);
            if !current.same_place(&after) {
                return false;
            }
            let keep_selection = current.selected_value != after.selected_value;
            before.restore(state, keep_selection);
            true
        });
        if restored {
            let state = self.state.borrow();
            warn!(
                object = %state.current_object_api_name,
                path = %state.current_path,
                "navigation undone after failed refresh"
            );
        }
        outcome
    }

    /// Merge expression for the current selection, with an optional fallback literal.
    ///
    /// `None` when nothing insertable is selected; hosts disable their insert action then.
    pub fn merge_expression(&self, fallback: Option<&str>) -> Option<String> {
        let state = self.state.borrow();
        match state.selected_option()? {
            FieldOption::Terminal { value, .. } => Some(build_merge_expression(value, fallback)),
            FieldOption::Aggregate { value, .. } => Some(value.clone()),
            FieldOption::Relationship { .. } => None,
        }
    }
}
