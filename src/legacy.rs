/// Upgrade path for values that predate the canonical editor: bracket-tagged
/// plain text (`[b]`, `[i]`, `[color:X]`) and raw newlines. Runs as pure text
/// preprocessing before the value is parsed into a tree; canonical values
/// contain neither brackets nor raw newlines and pass through unchanged.
pub fn convert_legacy_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut rest = raw;
    while let Some(idx) = rest.find('[') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        if let Some((replacement, consumed)) = match_bracket_tag(tail) {
            out.push_str(&replacement);
            rest = &tail[consumed..];
        } else {
            out.push('[');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out.replace("\r\n", "<br />").replace('\n', "<br />")
}

fn match_bracket_tag(tail: &str) -> Option<(String, usize)> {
    for (tag, replacement) in [
        ("[b]", "<strong>"),
        ("[/b]", "</strong>"),
        ("[i]", "<em>"),
        ("[/i]", "</em>"),
        ("[/color]", "</span>"),
    ] {
        if tail.starts_with(tag) {
            return Some((replacement.to_string(), tag.len()));
        }
    }
    if let Some(after) = tail.strip_prefix("[color:") {
        let close = after.find(']')?;
        let value = &after[..close];
        // The color itself is normalized later by the serializer pipeline.
        if value.contains('[') || value.contains('<') || value.contains('"') {
            return None;
        }
        return Some((
            format!("<span style=\"color:{}\">", value),
            "[color:".len() + close + 1,
        ));
    }
    None
}
