//! The merge-field grammar shared by the wizard, the editor and the preview:
//!
//! - `{!Account.Name}`: a field reached through zero or more relationships
//! - `{!Account.Name, "N/A"}`: the same field with a literal used when it is blank
//! - `{!tableStart:items}...{!tableEnd}`: a block repeated for each related row

use crate::error::{ExpressionError, ExpressionResult};
use regex::Regex;
use std::sync::OnceLock;

const OPEN: &str = "{!";
const CLOSE: &str = "}";
const TABLE_START: &str = "tableStart:";
const TABLE_END: &str = "tableEnd";

/// `{!...}` where braces may appear only inside a double-quoted fallback literal.
fn field_regex() -> &'static Regex {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    FIELD.get_or_init(|| Regex::new(r#"\{!((?:[^{}"]|"[^"]*")*)\}"#).unwrap())
}

fn path_regex() -> &'static Regex {
    static PATH: OnceLock<Regex> = OnceLock::new();
    PATH.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
    })
}

/// Join a relationship path and one more segment with `.`; an empty parent yields the segment.
pub fn qualify(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// `{!path}`
pub fn merge_field(path: &str) -> String {
    format!("{}{}{}", OPEN, path, CLOSE)
}

/// `{!tableStart:alias}<row>{!tableEnd}`
pub fn table_block(alias: &str, row_template: &str) -> String {
    format!(
        "{}{}{}{}{}{}{}{}",
        OPEN, TABLE_START, alias, CLOSE, row_template, OPEN, TABLE_END, CLOSE
    )
}

/// Returns the path of a single plain merge field (`{!path}`), or `None` for anything else:
/// table blocks, fields that already carry a fallback, or free text.
pub fn plain_field_path(value: &str) -> Option<&str> {
    let inner = value.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    if inner.is_empty() || inner.contains(['{', '}', ',']) || inner.starts_with(TABLE_START) {
        return None;
    }
    Some(inner)
}

/// Attach a fallback literal to a selected merge field.
///
/// `{!Name}` with `Some("N/A")` becomes `{!Name, "N/A"}`. An absent or empty fallback, or a
/// value that is not a single plain field, is returned unchanged. The literal is inserted
/// verbatim.
pub fn build_merge_expression(selected_value: &str, fallback: Option<&str>) -> String {
    match (plain_field_path(selected_value), fallback) {
        (Some(path), Some(literal)) if !literal.is_empty() => {
            format!("{}{}, \"{}\"{}", OPEN, path, literal, CLOSE)
        }
        _ => selected_value.to_string(),
    }
}

/// A field reference inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub path: String,
    pub fallback: Option<String>,
}

impl FieldRef {
    /// Relationship segments followed by the field name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }
}

/// One lexical piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Field(FieldRef),
    TableStart(String),
    TableEnd,
}

fn parse_inner(inner: &str, offset: usize, expression: &str) -> ExpressionResult<Token<'static>> {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return Err(ExpressionError::EmptyPath { offset });
    }
    if trimmed == TABLE_END {
        return Ok(Token::TableEnd);
    }
    if let Some(alias) = trimmed.strip_prefix(TABLE_START) {
        let alias = alias.trim();
        if !path_regex().is_match(alias) || alias.contains('.') {
            return Err(ExpressionError::InvalidTableAlias {
                alias: alias.to_string(),
            });
        }
        return Ok(Token::TableStart(alias.to_string()));
    }

    let (path, fallback) = match trimmed.split_once(',') {
        Some((path, literal)) => {
            let literal = literal.trim();
            let unquoted = literal
                .strip_prefix('"')
                .and_then(|l| l.strip_suffix('"'))
                .ok_or_else(|| ExpressionError::InvalidFallback {
                    expression: expression.to_string(),
                })?;
            (path.trim(), Some(unquoted.to_string()))
        }
        None => (trimmed, None),
    };

    if path.is_empty() {
        return Err(ExpressionError::EmptyPath { offset });
    }
    if !path_regex().is_match(path) {
        return Err(ExpressionError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(Token::Field(FieldRef {
        path: path.to_string(),
        fallback,
    }))
}

/// Split a template into text and merge tokens. Text between tokens is borrowed.
pub fn tokenize(template: &str) -> ExpressionResult<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in field_regex().captures_iter(template) {
        let whole = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
        let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let Some((start, end, expression)) = whole else {
            continue;
        };

        let text = &template[last..start];
        if let Some(pos) = text.find(OPEN) {
            return Err(ExpressionError::Unterminated { offset: last + pos });
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }
        tokens.push(parse_inner(inner, start, expression)?);
        last = end;
    }

    let rest = &template[last..];
    if let Some(pos) = rest.find(OPEN) {
        return Err(ExpressionError::Unterminated { offset: last + pos });
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    Ok(tokens)
}

/// A template as a tree: table blocks own the nodes between their start and end markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Field(FieldRef),
    Table { alias: String, body: Vec<Node> },
}

/// Tokenize and nest table blocks.
pub fn parse_template(template: &str) -> ExpressionResult<Vec<Node>> {
    // Each open table keeps its alias and the nodes collected so far.
    let mut stack: Vec<(String, Vec<Node>)> = Vec::new();
    let mut root: Vec<Node> = Vec::new();

    for token in tokenize(template)? {
        let node = match token {
            Token::Text(text) => Some(Node::Text(text.to_string())),
            Token::Field(field) => Some(Node::Field(field)),
            Token::TableStart(alias) => {
                stack.push((alias, Vec::new()));
                None
            }
            Token::TableEnd => {
                let (alias, body) = stack
                    .pop()
                    .ok_or(ExpressionError::UnmatchedTableEnd)?;
                Some(Node::Table { alias, body })
            }
        };
        if let Some(node) = node {
            match stack.last_mut() {
                Some((_, body)) => body.push(node),
                None => root.push(node),
            }
        }
    }

    if let Some((alias, _)) = stack.pop() {
        return Err(ExpressionError::UnclosedTable { alias });
    }
    Ok(root)
}
