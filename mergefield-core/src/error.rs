use mergefield_text::ExpressionError;
use thiserror::Error;

pub type MergeFieldResult<T> = Result<T, MergeFieldError>;

/// Error value returned by an external collaborator (schema provider, record store).
/// Platforms report either one message or a list of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .messages.join("; "))]
pub struct ProviderError {
    pub messages: Vec<String>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum MergeFieldError {
    #[error("Failed to load fields for '{object}': {source}")]
    DescriptorFetch {
        object: String,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid field descriptor '{api_name}': {reason}")]
    InvalidDescriptor { api_name: String, reason: String },

    #[error("Failed to update record '{record_id}': {source}")]
    Persistence {
        record_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("Failed to load record '{record_id}': {source}")]
    RecordLoad {
        record_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("Clipboard is not available")]
    ClipboardUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Template error: {0}")]
    Expression(#[from] ExpressionError),

    #[error("Wizard session '{id}' not found")]
    SessionNotFound { id: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for MergeFieldError {
    fn from(err: std::io::Error) -> Self {
        MergeFieldError::Io(err.to_string())
    }
}
