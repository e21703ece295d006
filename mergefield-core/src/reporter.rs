use crate::error::MergeFieldError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// Where user-facing errors and toasts go. Fire-and-forget.
pub trait Reporter: Send + Sync {
    /// `context` names the component that issued the failed request.
    fn report_error(&self, context: &str, error: &MergeFieldError, user_message: &str);

    fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Renders every report as a log event. Used by headless hosts and the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report_error(&self, context: &str, err: &MergeFieldError, user_message: &str) {
        error!(context, error = %err, "{}", user_message);
    }

    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!(title, "{}", message),
            Severity::Warning => warn!(title, "{}", message),
            Severity::Success | Severity::Info => info!(title, %severity, "{}", message),
        }
    }
}
