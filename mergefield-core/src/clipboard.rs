use crate::error::{MergeFieldError, MergeFieldResult};
use crate::reporter::{Reporter, Severity};
use mergefield_text::convert_html_for_clipboard;
use tracing::debug;

const CONTEXT: &str = "Clipboard";
const GENERIC_COPY_ERROR: &str = "Unable to copy to clipboard";

pub trait ClipboardSink: Send + Sync {
    /// Write plain text. `ClipboardUnavailable` means this sink cannot be used at all.
    fn write_text(&self, text: &str) -> MergeFieldResult<()>;
}

/// Tries the platform clipboard first and falls back when it is unavailable.
pub struct FallbackClipboard<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ClipboardSink, F: ClipboardSink> FallbackClipboard<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: ClipboardSink, F: ClipboardSink> ClipboardSink for FallbackClipboard<P, F> {
    fn write_text(&self, text: &str) -> MergeFieldResult<()> {
        match self.primary.write_text(text) {
            Err(MergeFieldError::ClipboardUnavailable) => {
                debug!("primary clipboard unavailable, using fallback");
                self.fallback.write_text(text)
            }
            other => other,
        }
    }
}

/// Copy `html` to the clipboard as plain text and tell the user how it went.
pub fn copy_as_plain_text(html: &str, sink: &dyn ClipboardSink, reporter: &dyn Reporter) -> bool {
    let text = convert_html_for_clipboard(html);
    match sink.write_text(&text) {
        Ok(()) => {
            reporter.notify("Copied", "Template text copied to clipboard", Severity::Success);
            true
        }
        Err(err) => {
            let message = match &err {
                MergeFieldError::Clipboard(message) if !message.trim().is_empty() => message.as_str(),
                _ => GENERIC_COPY_ERROR,
            };
            reporter.report_error(CONTEXT, &err, message);
            false
        }
    }
}
