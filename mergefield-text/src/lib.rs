//! # Merge-field text utilities
//!
//! The textual contracts of the contract-template tooling:
//!
//! - [`expression`]: the merge-field grammar (`{!path}`, `{!path, "fallback"}`,
//!   `{!tableStart:alias}...{!tableEnd}`), building and parsing
//! - [`html`]: conversions between editor rich text, the escaped stored form and
//!   clipboard plain text
//!
//! ## Example
//! ```
//! use mergefield_text::{build_merge_expression, convert_html_for_clipboard, normalize_html};
//!
//! assert_eq!(build_merge_expression("{!Name}", Some("N/A")), "{!Name, \"N/A\"}");
//! assert_eq!(normalize_html("<br/>  a   b "), "<br> a b");
//! assert_eq!(convert_html_for_clipboard("<b>Hi</b><br>there"), "Hi\nthere");
//! ```

pub mod error;
pub mod expression;
pub mod html;

pub use error::{ExpressionError, ExpressionResult};
pub use expression::{
    build_merge_expression, merge_field, parse_template, plain_field_path, qualify, table_block,
    tokenize, FieldRef, Node, Token,
};
pub use html::{convert_html_for_clipboard, escape_html, normalize_html, unescape_allowed_html};
