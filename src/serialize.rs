use crate::EngineConfig;
use crate::legacy::convert_legacy_markup;
use crate::style_attr::StyleSpec;
use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};

pub(crate) const BREAK: &str = "<br />";

/// Runs the whole normalization pipeline for externally supplied values:
/// legacy conversion, fragment parsing in body context, recursive
/// serialization into the canonical grammar, and break collapsing.
/// Idempotent for every input.
pub(crate) fn normalize_with(input: Option<&str>, config: &EngineConfig) -> String {
    let raw = input.unwrap_or("");
    if raw.trim().is_empty() {
        return String::new();
    }
    canonicalize(&convert_legacy_markup(raw), config)
}

/// Canonicalizes markup without the legacy pre-pass. The interactive edit
/// path uses this: bracket text a user types or pastes is content, not
/// markup, and must stay literal through every re-serialization.
pub(crate) fn canonicalize(fragment: &str, config: &EngineConfig) -> String {
    if fragment.trim().is_empty() {
        return String::new();
    }
    let body = parse_body(fragment);
    collapse_breaks(serialize_children(&body, config))
}

/// Parses a fragment inside a minimal document shell so the HTML parser
/// applies body insertion rules, and returns the body node.
pub(crate) fn parse_body(fragment: &str) -> NodeRef {
    let html = format!("<!doctype html><html><body>{fragment}</body></html>");
    let document = kuchiki::parse_html().one(html);
    match document.select_first("body") {
        Ok(body) => body.as_node().clone(),
        Err(()) => document,
    }
}

pub(crate) fn serialize_children(node: &NodeRef, config: &EngineConfig) -> String {
    let mut out = String::new();
    for child in node.children() {
        serialize_node(&child, config, &mut out);
    }
    out
}

fn serialize_node(node: &NodeRef, config: &EngineConfig, out: &mut String) {
    match node.data() {
        NodeData::Text(text) => escape_text(&text.borrow(), out),
        NodeData::Element(element) => {
            let name = element.name.local.as_ref();
            match name {
                "br" => out.push_str(BREAK),
                // Blocks terminate their line; an empty block still occupies one.
                "div" | "p" => {
                    let inner = serialize_children(node, config);
                    if inner.is_empty() {
                        out.push_str(BREAK);
                    } else {
                        out.push_str(&inner);
                        if !inner.ends_with(BREAK) {
                            out.push_str(BREAK);
                        }
                    }
                }
                "strong" | "b" => wrap_nonempty(node, config, out, "strong"),
                "em" | "i" => wrap_nonempty(node, config, out, "em"),
                "span" | "font" => {
                    let spec = element_style(node, name, config);
                    let inner = serialize_children(node, config);
                    if inner.is_empty() {
                        return;
                    }
                    match spec.to_css() {
                        Some(css) => {
                            out.push_str("<span style=\"");
                            out.push_str(&css);
                            out.push_str("\">");
                            out.push_str(&inner);
                            out.push_str("</span>");
                        }
                        // Bare styling spans degrade to plain text.
                        None => out.push_str(&inner),
                    }
                }
                // Foreign markup is transparent: keep the content, drop the tag.
                _ => out.push_str(&serialize_children(node, config)),
            }
        }
        _ => out.push_str(&serialize_children(node, config)),
    }
}

fn wrap_nonempty(node: &NodeRef, config: &EngineConfig, out: &mut String, tag: &str) {
    let inner = serialize_children(node, config);
    if inner.is_empty() {
        return;
    }
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&inner);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn element_style(node: &NodeRef, name: &str, config: &EngineConfig) -> StyleSpec {
    let Some(element) = node.as_element() else {
        return StyleSpec::default();
    };
    let attributes = element.attributes.borrow();
    if name == "font" {
        StyleSpec::from_font_attrs(attributes.get("color"), attributes.get("size"), config)
    } else {
        attributes
            .get("style")
            .map(|style| StyleSpec::from_inline_style(style, config))
            .unwrap_or_default()
    }
}

/// HTML-escapes text content. In a run of consecutive spaces the first stays
/// literal and the rest become `&nbsp;` entities so the browser does not
/// collapse them on redisplay.
pub(crate) fn escape_text(text: &str, out: &mut String) {
    let mut prev_space = false;
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            ' ' => {
                if prev_space {
                    out.push_str("&nbsp;");
                } else {
                    out.push(' ');
                }
            }
            _ => out.push(ch),
        }
        prev_space = ch == ' ';
    }
}

/// Bounds consecutive breaks at two and coerces a break-only value to empty,
/// which is what the required-field checks treat as "no content".
pub(crate) fn collapse_breaks(mut value: String) -> String {
    let triple = format!("{BREAK}{BREAK}{BREAK}");
    let double = format!("{BREAK}{BREAK}");
    while value.contains(&triple) {
        value = value.replace(&triple, &double);
    }
    if value.trim() == BREAK {
        return String::new();
    }
    value
}
