use crate::EngineConfig;
use crate::serialize::{self, BREAK, parse_body};
use crate::style_attr::StyleSpec;
use kuchiki::{NodeData, NodeRef};

/// The controller's live model: the canonical value flattened into styled
/// runs and explicit line breaks. Offsets over this sequence line up with
/// `plain::extract_plain_text` — one unit per character, one per break.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Piece {
    Run(TextRun),
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub style: StyleSpec,
}

impl TextRun {
    pub(crate) fn plain(text: String) -> Self {
        TextRun {
            text,
            bold: false,
            italic: false,
            style: StyleSpec::default(),
        }
    }

    fn same_marks(&self, other: &TextRun) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.style == other.style
    }
}

impl Piece {
    pub fn len(&self) -> usize {
        match self {
            Piece::Run(run) => run.text.chars().count(),
            Piece::Break => 1,
        }
    }
}

pub(crate) fn total_len(pieces: &[Piece]) -> usize {
    pieces.iter().map(Piece::len).sum()
}

/// Flattens a canonical value into runs, baking every inherited wrapper
/// (strong/em/nested spans) into per-run effective styling.
pub(crate) fn flatten(value: &str, config: &EngineConfig) -> Vec<Piece> {
    let mut pieces = Vec::new();
    if value.trim().is_empty() {
        return pieces;
    }
    let body = parse_body(value);
    let inherited = TextRun::plain(String::new());
    flatten_node(&body, &inherited, config, &mut pieces);
    merge_adjacent(&mut pieces);
    pieces
}

fn flatten_node(node: &NodeRef, inherited: &TextRun, config: &EngineConfig, out: &mut Vec<Piece>) {
    for child in node.children() {
        match child.data() {
            NodeData::Text(text) => {
                let text = text.borrow().clone();
                if text.is_empty() {
                    continue;
                }
                out.push(Piece::Run(TextRun {
                    text,
                    ..inherited.clone()
                }));
            }
            NodeData::Element(element) => {
                let name = element.name.local.as_ref();
                match name {
                    "br" => out.push(Piece::Break),
                    "strong" | "b" => {
                        let next = TextRun {
                            bold: true,
                            ..inherited.clone()
                        };
                        flatten_node(&child, &next, config, out);
                    }
                    "em" | "i" => {
                        let next = TextRun {
                            italic: true,
                            ..inherited.clone()
                        };
                        flatten_node(&child, &next, config, out);
                    }
                    "span" | "font" => {
                        let attributes = element.attributes.borrow();
                        let spec = if name == "font" {
                            StyleSpec::from_font_attrs(
                                attributes.get("color"),
                                attributes.get("size"),
                                config,
                            )
                        } else {
                            attributes
                                .get("style")
                                .map(|style| StyleSpec::from_inline_style(style, config))
                                .unwrap_or_default()
                        };
                        drop(attributes);
                        let mut style = inherited.style.clone();
                        style.overlay(&spec);
                        let next = TextRun {
                            style,
                            ..inherited.clone()
                        };
                        flatten_node(&child, &next, config, out);
                    }
                    // Defensive: block children terminate a line like the
                    // serializer does, anything else is transparent.
                    "div" | "p" => {
                        flatten_node(&child, inherited, config, out);
                        if !matches!(out.last(), Some(Piece::Break) | None) {
                            out.push(Piece::Break);
                        }
                    }
                    _ => flatten_node(&child, inherited, config, out),
                }
            }
            _ => {}
        }
    }
}

/// Serializes runs back into grammar-shaped HTML. Callers re-normalize the
/// result, which keeps escaping and break collapsing in one place.
pub(crate) fn rebuild(pieces: &[Piece]) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Break => out.push_str(BREAK),
            Piece::Run(run) => {
                if run.text.is_empty() {
                    continue;
                }
                let mut text = String::new();
                serialize::escape_text(&run.text, &mut text);
                if run.italic {
                    text = format!("<em>{text}</em>");
                }
                if run.bold {
                    text = format!("<strong>{text}</strong>");
                }
                if let Some(css) = run.style.to_css() {
                    text = format!("<span style=\"{css}\">{text}</span>");
                }
                out.push_str(&text);
            }
        }
    }
    out
}

/// Ensures a piece boundary at `offset` and returns the index of the piece
/// that starts there. Splits the containing run when the offset falls inside
/// one.
pub(crate) fn split_boundary(pieces: &mut Vec<Piece>, offset: usize) -> usize {
    let mut consumed = 0;
    for idx in 0..pieces.len() {
        let len = pieces[idx].len();
        if offset == consumed {
            return idx;
        }
        if offset < consumed + len {
            let Piece::Run(run) = &pieces[idx] else {
                // A break is a single unit; offsets inside it cannot occur.
                return idx;
            };
            let split_chars = offset - consumed;
            let byte_idx = run
                .text
                .char_indices()
                .nth(split_chars)
                .map(|(byte, _)| byte)
                .unwrap_or(run.text.len());
            let mut left = run.clone();
            let mut right = run.clone();
            left.text = run.text[..byte_idx].to_string();
            right.text = run.text[byte_idx..].to_string();
            pieces[idx] = Piece::Run(left);
            pieces.insert(idx + 1, Piece::Run(right));
            return idx + 1;
        }
        consumed += len;
    }
    pieces.len()
}

/// The style carried by the character just before `offset`, used to style
/// newly typed text.
pub(crate) fn style_at(pieces: &[Piece], offset: usize) -> TextRun {
    if offset == 0 {
        return TextRun::plain(String::new());
    }
    let mut consumed = 0;
    for piece in pieces {
        let len = piece.len();
        if offset <= consumed + len {
            return match piece {
                Piece::Run(run) => TextRun {
                    text: String::new(),
                    ..run.clone()
                },
                Piece::Break => TextRun::plain(String::new()),
            };
        }
        consumed += len;
    }
    TextRun::plain(String::new())
}

pub(crate) fn merge_adjacent(pieces: &mut Vec<Piece>) {
    let mut idx = 0;
    while idx + 1 < pieces.len() {
        let mergeable = match (&pieces[idx], &pieces[idx + 1]) {
            (Piece::Run(a), Piece::Run(b)) => a.same_marks(b),
            _ => false,
        };
        if mergeable {
            if let Piece::Run(next) = pieces.remove(idx + 1) {
                if let Piece::Run(current) = &mut pieces[idx] {
                    current.text.push_str(&next.text);
                }
            }
        } else {
            idx += 1;
        }
    }
    pieces.retain(|piece| !matches!(piece, Piece::Run(run) if run.text.is_empty()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::standard()
    }

    #[test]
    fn flatten_bakes_inherited_styles_into_runs() {
        let value = "<span style=\"color:#ff0000\">a<strong>b</strong></span><br />c";
        let pieces = flatten(value, &config());
        assert_eq!(pieces.len(), 4, "unexpected pieces: {pieces:?}");
        let Piece::Run(first) = &pieces[0] else {
            panic!("expected run")
        };
        assert_eq!(first.text, "a");
        assert!(!first.bold);
        assert_eq!(first.style.to_css().as_deref(), Some("color:#ff0000"));
        let Piece::Run(second) = &pieces[1] else {
            panic!("expected run")
        };
        assert!(second.bold, "strong inside span must stay bold");
        assert_eq!(second.style.to_css().as_deref(), Some("color:#ff0000"));
        assert_eq!(pieces[2], Piece::Break);
    }

    #[test]
    fn nested_spans_overlay_properties() {
        let value = "<span style=\"color:#ff0000;font-size:20px\">\
                     <span style=\"color:#0000ff\">x</span></span>";
        let pieces = flatten(value, &config());
        let Piece::Run(run) = &pieces[0] else {
            panic!("expected run")
        };
        assert_eq!(
            run.style.to_css().as_deref(),
            Some("color:#0000ff;font-size:20px"),
            "inner color overrides, outer size inherited"
        );
    }

    #[test]
    fn rebuild_roundtrips_through_normalize() {
        let cfg = config();
        let value = "<strong>Hi</strong><br /><span style=\"color:#ff0000\">there</span>";
        let pieces = flatten(value, &cfg);
        let rebuilt = crate::serialize::normalize_with(Some(&rebuild(&pieces)), &cfg);
        assert_eq!(rebuilt, value);
    }

    #[test]
    fn split_boundary_splits_runs_on_char_offsets() {
        let mut pieces = flatten("héllo", &config());
        let idx = split_boundary(&mut pieces, 2);
        assert_eq!(idx, 1);
        let Piece::Run(left) = &pieces[0] else {
            panic!("expected run")
        };
        let Piece::Run(right) = &pieces[1] else {
            panic!("expected run")
        };
        assert_eq!(left.text, "hé");
        assert_eq!(right.text, "llo");
    }

    #[test]
    fn total_len_counts_breaks_as_one() {
        let pieces = flatten("ab<br />cd", &config());
        assert_eq!(total_len(&pieces), 5);
    }

    #[test]
    fn style_at_returns_the_style_to_the_left() {
        let pieces = flatten("<strong>ab</strong>cd", &config());
        assert!(style_at(&pieces, 1).bold);
        assert!(style_at(&pieces, 2).bold);
        assert!(!style_at(&pieces, 3).bold);
        assert!(!style_at(&pieces, 0).bold);
    }

    #[test]
    fn merge_adjacent_joins_equal_runs() {
        let mut pieces = vec![
            Piece::Run(TextRun::plain("a".to_string())),
            Piece::Run(TextRun::plain("b".to_string())),
            Piece::Break,
            Piece::Run(TextRun::plain("c".to_string())),
        ];
        merge_adjacent(&mut pieces);
        assert_eq!(pieces.len(), 3);
        let Piece::Run(run) = &pieces[0] else {
            panic!("expected run")
        };
        assert_eq!(run.text, "ab");
    }
}
