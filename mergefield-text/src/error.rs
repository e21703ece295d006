use thiserror::Error;

pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("Unterminated merge field starting at offset {offset}")]
    Unterminated { offset: usize },

    #[error("Empty merge field at offset {offset}")]
    EmptyPath { offset: usize },

    #[error("Invalid merge field path '{path}': segments must be identifiers separated by '.'")]
    InvalidPath { path: String },

    #[error("Invalid fallback in '{expression}': fallback must be a double-quoted literal")]
    InvalidFallback { expression: String },

    #[error("Invalid table alias '{alias}'")]
    InvalidTableAlias { alias: String },

    #[error("'{{!tableEnd}}' has no matching tableStart")]
    UnmatchedTableEnd,

    #[error("Table '{alias}' is never closed with '{{!tableEnd}}'")]
    UnclosedTable { alias: String },
}
