use crate::EngineConfig;
use crate::color::NormalizedColor;
use crate::fontsize::{clamp_px, format_px};
use crate::segment::{Piece, merge_adjacent, split_boundary, total_len};
use crate::style_attr::StyleSpec;

/// A context-menu styling command against the current selection. Color and
/// background take any CSS color representation; unrecognized values make
/// the command a no-op, the same silent-drop discipline the serializer uses.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleCommand {
    Bold,
    Italic,
    Color(String),
    Background(String),
    FontSize(f32),
    ClearFormatting,
}

const WHITE: &str = "#ffffff";

/// Applies a command to `[start, end)` over the live run model. Returns
/// whether anything changed; collapsed or out-of-range selections are
/// no-ops.
pub(crate) fn apply_command(
    pieces: &mut Vec<Piece>,
    start: usize,
    end: usize,
    command: &StyleCommand,
    config: &EngineConfig,
) -> bool {
    let limit = total_len(pieces);
    let start = start.min(limit);
    let end = end.min(limit);
    if start >= end {
        return false;
    }

    // Resolve command inputs first so a dropped color never half-applies.
    let patch = match command {
        StyleCommand::Color(raw) => {
            let Some(color) = NormalizedColor::parse(raw, config) else {
                return false;
            };
            Patch::Color(color)
        }
        StyleCommand::Background(raw) => {
            let Some(color) = NormalizedColor::parse(raw, config) else {
                return false;
            };
            Patch::Background(color)
        }
        StyleCommand::FontSize(px) => {
            if !px.is_finite() {
                return false;
            }
            Patch::FontSize(format_px(clamp_px(*px, config)))
        }
        StyleCommand::Bold => Patch::Bold,
        StyleCommand::Italic => Patch::Italic,
        StyleCommand::ClearFormatting => Patch::Clear,
    };

    let first = split_boundary(pieces, start);
    let after = split_boundary(pieces, end);

    // Bold/italic toggle: remove the mark only when the whole selection
    // already carries it.
    let enable = match patch {
        Patch::Bold => Some(!selected_runs(pieces, first, after).all(|run| run.bold)),
        Patch::Italic => Some(!selected_runs(pieces, first, after).all(|run| run.italic)),
        _ => None,
    };

    for piece in &mut pieces[first..after] {
        let Piece::Run(run) = piece else { continue };
        match (&patch, enable) {
            (Patch::Bold, Some(value)) => run.bold = value,
            (Patch::Italic, Some(value)) => run.italic = value,
            (Patch::Color(color), _) => run.style.color = Some(color.clone()),
            (Patch::Background(color), _) => {
                run.style.background = Some(color.clone());
                // Text over a fresh background defaults to white so it stays
                // readable; an explicit foreground is never overridden.
                if run.style.color.is_none() {
                    run.style.color = Some(NormalizedColor::Hex(WHITE.to_string()));
                }
            }
            (Patch::FontSize(size), _) => run.style.font_size = Some(size.clone()),
            (Patch::Clear, _) => {
                run.bold = false;
                run.italic = false;
                run.style = StyleSpec::default();
            }
            _ => {}
        }
    }

    merge_adjacent(pieces);
    true
}

enum Patch {
    Bold,
    Italic,
    Color(NormalizedColor),
    Background(NormalizedColor),
    FontSize(String),
    Clear,
}

fn selected_runs(
    pieces: &[Piece],
    first: usize,
    after: usize,
) -> impl Iterator<Item = &crate::segment::TextRun> {
    pieces[first..after].iter().filter_map(|piece| match piece {
        Piece::Run(run) => Some(run),
        Piece::Break => None,
    })
}
