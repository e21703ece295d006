//! Renders a template against a sample record so authors can check their merge fields.

use crate::error::MergeFieldResult;
use mergefield_text::{convert_html_for_clipboard, escape_html, parse_template, FieldRef, Node};
use serde_json::Value;

/// Substitute every merge field in `template` with values from `record`.
///
/// Paths walk nested objects (`Account.Owner.Name`). A missing, null or empty value renders the
/// field's fallback literal, or nothing. A table block repeats its body for each row of the
/// array at its alias; a `{ "records": [...] }` wrapper is accepted too. Values are escaped.
pub fn render_preview(template: &str, record: &Value) -> MergeFieldResult<String> {
    let nodes = parse_template(template)?;
    let mut out = String::with_capacity(template.len());
    render_nodes(&nodes, record, &mut out);
    Ok(out)
}

/// The rendered preview as clipboard plain text.
pub fn preview_plain_text(template: &str, record: &Value) -> MergeFieldResult<String> {
    Ok(convert_html_for_clipboard(&render_preview(template, record)?))
}

fn render_nodes(nodes: &[Node], scope: &Value, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Field(field) => {
                let value = resolve(scope, field).and_then(display_value);
                match (value, field.fallback.as_deref()) {
                    (Some(value), _) => out.push_str(&escape_html(&value)),
                    (None, Some(fallback)) => out.push_str(&escape_html(fallback)),
                    (None, None) => {}
                }
            }
            Node::Table { alias, body } => {
                for row in rows(scope.get(alias.as_str())) {
                    render_nodes(body, row, out);
                }
            }
        }
    }
}

fn resolve<'a>(scope: &'a Value, field: &FieldRef) -> Option<&'a Value> {
    field
        .segments()
        .try_fold(scope, |current, segment| current.get(segment))
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn rows(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(rows)) => rows,
        Some(Value::Object(wrapper)) => match wrapper.get("records") {
            Some(Value::Array(rows)) => rows,
            _ => &[],
        },
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mergefield_text::build_merge_expression;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn substitutes_nested_paths() {
        let record = json!({ "Name": "C-001", "Account": { "Name": "Acme & Co" } });
        assert_eq!(
            render_preview("<p>{!Name} for {!Account.Name}</p>", &record).unwrap(),
            "<p>C-001 for Acme &amp; Co</p>"
        );
    }

    #[test]
    fn missing_values_use_fallback() {
        let record = json!({ "Account": null, "Nickname": "" });
        assert_eq!(
            render_preview("{!Account.Name, \"N/A\"}|{!Nickname, \"none\"}|{!Other}", &record)
                .unwrap(),
            "N/A|none|"
        );
    }

    #[test]
    fn fallback_with_braces_renders() {
        let template = format!("<p>{}</p>", build_merge_expression("{!Name}", Some("{none}")));
        assert_eq!(render_preview(&template, &json!({})).unwrap(), "<p>{none}</p>");
    }

    #[test]
    fn tables_repeat_per_row() {
        let record = json!({
            "contractItems": { "records": [
                { "Name": "Swim", "Price__c": 40 },
                { "Name": "Gym", "Price__c": 25.5 }
            ]}
        });
        let template = "<ul>{!tableStart:contractItems}<li>{!Name} - {!Price__c}</li>{!tableEnd}</ul>";
        assert_eq!(
            render_preview(template, &record).unwrap(),
            "<ul><li>Swim - 40</li><li>Gym - 25.5</li></ul>"
        );
    }

    #[test]
    fn plain_text_preview() {
        let record = json!({ "Name": "Jo" });
        assert_eq!(
            preview_plain_text("<b>Hello</b><br>{!Name}", &record).unwrap(),
            "Hello\nJo"
        );
    }

    #[test]
    fn malformed_template_is_error() {
        assert!(render_preview("{!Name", &json!({})).is_err());
    }
}
