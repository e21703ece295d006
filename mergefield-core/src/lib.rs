//! # Merge-field template tooling
//!
//! Builds and previews merge-field templates for contract and form records.
//!
//! ## Features
//! - Relationship-path navigator that walks objects, fields and related objects and yields
//!   `{!Account.Name}`-style merge expressions
//! - Wizard sessions with fallback literals and modal outcomes
//! - Template editor with formatting-insensitive dirty checks and save/reload
//! - Preview rendering against a sample record, and plain-text clipboard export
//!
//! Schema metadata, record persistence, toasts and the clipboard are external collaborators,
//! reached through [`SchemaProvider`], [`RecordStore`], [`Reporter`] and [`ClipboardSink`].
//!
//! ## Example
//! ```ignore
//! use std::sync::Arc;
//! use mergefield_core::{Config, FieldDescriptor, InMemorySchemaProvider, PathNavigator, TracingReporter};
//!
//! let provider = InMemorySchemaProvider::default()
//!     .with_object("Contract", vec![FieldDescriptor::field("Name", "Contract Name")]);
//! let navigator = PathNavigator::new(Arc::new(provider), Arc::new(TracingReporter), Config::default());
//! navigator.open("Contract").await;
//! navigator.select_option("{!Name}").await;
//! assert_eq!(navigator.merge_expression(Some("N/A")).as_deref(), Some("{!Name, \"N/A\"}"));
//! ```

pub mod clipboard;
pub mod config;
pub mod descriptor;
pub mod editor;
pub mod error;
pub mod navigator;
pub mod option;
pub mod preview;
pub mod provider;
pub mod record;
pub mod reporter;
pub mod wizard;

pub use clipboard::{copy_as_plain_text, ClipboardSink, FallbackClipboard};
pub use config::Config;
pub use descriptor::{DescriptorKind, FieldDescriptor};
pub use editor::{SaveOutcome, TemplateEditor};
pub use error::{MergeFieldError, MergeFieldResult, ProviderError};
pub use navigator::{BreadcrumbEntry, NavigatorState, PathNavigator, Refresh};
pub use option::{build_options, FieldOption};
pub use preview::{preview_plain_text, render_preview};
pub use provider::{InMemorySchemaProvider, Schema, SchemaProvider};
pub use record::{RecordSnapshot, RecordStore};
pub use reporter::{Reporter, Severity, TracingReporter};
pub use wizard::{MergeFieldWizard, ModalHost, ModalOutcome, WizardSessions};
