//! Conversions between the three text forms a template passes through:
//! editor rich text, the escaped form held on the record, and clipboard plain text.
//!
//! Every function here is total: malformed markup is substituted best-effort, never rejected.

use regex::{NoExpand, Regex};
use std::sync::OnceLock;

/// Escaped markup that is turned back into live markup after an escaping round-trip.
/// Order matters: the `<br>` spellings are tried before anything else.
const ALLOWED_ESCAPED_TAGS: &[(&str, &str)] = &[
    ("&lt;br&gt;", "<br>"),
    ("&lt;br/&gt;", "<br>"),
    ("&lt;br /&gt;", "<br>"),
    ("&lt;ul&gt;", "<ul>"),
    ("&lt;/ul&gt;", "</ul>"),
    ("&lt;li&gt;", "<li>"),
    ("&lt;/li&gt;", "</li>"),
    ("&lt;b&gt;", "<b>"),
    ("&lt;/b&gt;", "</b>"),
    ("&lt;i&gt;", "<i>"),
    ("&lt;/i&gt;", "</i>"),
    ("&lt;u&gt;", "<u>"),
    ("&lt;/u&gt;", "</u>"),
    ("&amp;bull;", "&bull;"),
];

pub const BULLET: char = '\u{2022}';

fn allowed_tag_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ALLOWED_ESCAPED_TAGS
            .iter()
            .map(|(escaped, tag)| {
                let pattern = format!("(?i){}", regex::escape(escaped));
                (Regex::new(&pattern).unwrap(), *tag)
            })
            .collect()
    })
}

fn line_break_regex() -> &'static Regex {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    LINE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").unwrap())
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn bullet_regex() -> &'static Regex {
    static BULLET_ENTITY: OnceLock<Regex> = OnceLock::new();
    BULLET_ENTITY.get_or_init(|| Regex::new(r"(?i)&bull;").unwrap())
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"</?[^>]+(>|$)").unwrap())
}

/// Escape text for inclusion in markup.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Re-enable the allow-listed formatting tags (`<br>`, `<ul>`, `<li>`, `<b>`, `<i>`, `<u>`,
/// `&bull;`) that an escaping layer turned into entities. Matching on the escaped form is
/// case-insensitive; every other entity is left alone.
pub fn unescape_allowed_html(content: &str) -> String {
    let mut output = content.to_string();
    for (pattern, tag) in allowed_tag_patterns() {
        output = pattern.replace_all(&output, NoExpand(*tag)).into_owned();
    }
    output
}

/// Decode the small entity set both normalizers understand.
/// `&amp;` is decoded after `&lt;`, so `&amp;lt;` decodes to the literal text `&lt;`.
fn decode_common_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
}

fn normalize_once(input: &str) -> String {
    let decoded = decode_common_entities(input);
    let breaks = line_break_regex().replace_all(&decoded, "<br>");
    let collapsed = whitespace_regex().replace_all(&breaks, " ");
    collapsed.trim().to_string()
}

/// Canonical form of editor markup, used to decide whether a template body really changed.
///
/// Decodes `&nbsp;`, U+00A0, `&lt;`, `&gt;`, `&amp;` and `&quot;`, folds every `<br>` spelling
/// into `<br>`, collapses whitespace runs to one space and trims.
///
/// The single pass is repeated to a fixed point, so the result is idempotent even for
/// double-escaped input such as `&amp;lt;`. Each pass either shortens the text or only swaps
/// whitespace characters for spaces, so the loop terminates.
pub fn normalize_html(input: &str) -> String {
    let mut current = normalize_once(input);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Plain text for the clipboard: decodes entities, turns `&bull;` into a bullet and `<br>` into
/// a newline, strips every remaining tag and trims.
pub fn convert_html_for_clipboard(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let decoded = decode_common_entities(input);
    let bullet = BULLET.to_string();
    let bulleted = bullet_regex().replace_all(&decoded, NoExpand(&bullet));
    let broken = line_break_regex().replace_all(&bulleted, "\n");
    let stripped = tag_regex().replace_all(&broken, "");
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_then_normalize_restores_text() {
        let text = "a < b & \"c\"";
        assert_eq!(escape_html(text), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(normalize_html(&escape_html(text)), text);
    }

    #[test]
    fn unescape_restores_allowed_tags() {
        assert_eq!(
            unescape_allowed_html("&lt;b&gt;Bold&lt;/b&gt;&lt;br /&gt;next"),
            "<b>Bold</b><br>next"
        );
    }

    #[test]
    fn unescape_is_case_insensitive() {
        assert_eq!(unescape_allowed_html("&LT;BR&GT;&Lt;UL&gT;"), "<br><ul>");
    }

    #[test]
    fn unescape_keeps_other_entities() {
        assert_eq!(
            unescape_allowed_html("&lt;script&gt;&amp;bull; &quot;x&quot;"),
            "&lt;script&gt;&bull; &quot;x&quot;"
        );
    }

    #[test]
    fn normalize_folds_breaks_and_whitespace() {
        assert_eq!(normalize_html("<br/>  a   b "), "<br> a b");
        assert_eq!(normalize_html("a<BR >b<br />c"), "a<br>b<br>c");
    }

    #[test]
    fn normalize_decodes_entities() {
        assert_eq!(
            normalize_html("&lt;p&gt;Tom&nbsp;&amp;\u{a0}Jerry&quot;&lt;/p&gt;"),
            "<p>Tom & Jerry\"</p>"
        );
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert_eq!(normalize_html(""), "");
        assert_eq!(normalize_html(" \n\t "), "");
    }

    #[test]
    fn normalize_double_escaped_is_idempotent() {
        let once = normalize_html("&amp;lt;br/&amp;gt;  x");
        assert_eq!(once, "<br> x");
        assert_eq!(normalize_html(&once), once);
    }

    #[test]
    fn clipboard_strips_tags_and_breaks_lines() {
        assert_eq!(convert_html_for_clipboard("<b>Hi</b><br>there"), "Hi\nthere");
    }

    #[test]
    fn clipboard_converts_bullets() {
        assert_eq!(
            convert_html_for_clipboard("<ul><li>&bull; one</li><li>&BULL; two</li></ul>"),
            "\u{2022} one\u{2022} two"
        );
    }

    #[test]
    fn clipboard_strips_unterminated_tag() {
        assert_eq!(convert_html_for_clipboard("text <span class=\"x\""), "text");
    }
}
