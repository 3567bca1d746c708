use crate::serialize::parse_body;

/// Derives the user-visible text of a canonical value: `<br>` variants become
/// newlines, markup is stripped, and non-breaking spaces read back as plain
/// spaces.
pub fn extract_plain_text(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let with_newlines = replace_breaks(value);
    let body = parse_body(&with_newlines);
    body.text_contents().replace('\u{a0}', " ")
}

/// Character count against a field limit. Every line break counts as one
/// character; trailing line terminators are presentation, not content, and
/// are trimmed before counting.
pub fn plain_text_length(value: &str) -> usize {
    extract_plain_text(value)
        .trim_end_matches('\n')
        .chars()
        .count()
}

/// The emptiness check used by required-field validation.
pub fn is_blank(value: &str) -> bool {
    extract_plain_text(value).trim().is_empty()
}

/// Replaces `<br>`, `<br/>` and `<br />` (any case) with `\n` before the
/// remainder is parsed. Escaped text cannot match: a literal `&lt;br&gt;` in
/// canonical content carries no raw `<`.
fn replace_breaks(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let bytes = value.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if is_break_start(&value[idx..]) {
            if let Some(close) = value[idx..].find('>') {
                out.push('\n');
                idx += close + 1;
                continue;
            }
        }
        let ch = value[idx..].chars().next().unwrap_or('\u{fffd}');
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

fn is_break_start(rest: &str) -> bool {
    let lower = rest.get(..3).map(|s| s.to_ascii_lowercase());
    if lower.as_deref() != Some("<br") {
        return false;
    }
    matches!(
        rest.as_bytes().get(3),
        Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t')
    )
}
