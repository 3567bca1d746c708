use crate::debug::DebugLogger;
use crate::plain::plain_text_length;
use crate::segment::{self, Piece, TextRun};
use crate::selection::StyleCommand;
use crate::serialize::{self, normalize_with};
use crate::{EngineConfig, selection};
use std::sync::Arc;

/// The decision for one edit. Rejection restores the last accepted value;
/// the caller is never notified of a rejected candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Accepted { value: String, length: usize },
    Rejected,
}

/// Controller for one editable surface. Owns the last accepted canonical
/// value and the live run model derived from it; every mutation runs the
/// full normalize pipeline and is accepted or rejected against the length
/// ceiling before the model advances.
pub struct Editor {
    config: Arc<EngineConfig>,
    debug: Option<Arc<DebugLogger>>,
    max_length: Option<usize>,
    value: String,
    length: usize,
    pieces: Vec<Piece>,
}

impl Editor {
    pub(crate) fn new(
        config: Arc<EngineConfig>,
        debug: Option<Arc<DebugLogger>>,
        initial: Option<&str>,
        max_length: Option<usize>,
    ) -> Self {
        let value = normalize_with(initial, &config);
        let length = plain_text_length(&value);
        let pieces = segment::flatten(&value, &config);
        Editor {
            config,
            debug,
            max_length,
            value,
            length,
            pieces,
        }
    }

    /// The last accepted canonical value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Plain-text length of the last accepted value.
    pub fn plain_length(&self) -> usize {
        self.length
    }

    pub fn is_blank(&self) -> bool {
        crate::plain::is_blank(&self.value)
    }

    /// Replaces the surface content with an externally supplied value, e.g.
    /// when the hosting form rebinds the field. External values are not
    /// subject to the edit ceiling.
    pub fn set_value(&mut self, external: Option<&str>) {
        self.value = normalize_with(external, &self.config);
        self.length = plain_text_length(&self.value);
        self.pieces = segment::flatten(&self.value, &self.config);
    }

    /// An arbitrary mutation of the live surface, handed over as the markup
    /// the surface now contains. This is the raw input-event path: the
    /// candidate is canonicalized and accepted or rejected as a whole.
    /// Legacy bracket conversion does not apply here; a live surface only
    /// ever holds bracket characters as literal text.
    pub fn propose_html(&mut self, html: &str) -> EditOutcome {
        let canonical = serialize::canonicalize(html, &self.config);
        self.decide(canonical)
    }

    /// Inserts typed text at a character offset, inheriting the style of the
    /// character to the left of the caret.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> EditOutcome {
        if text.is_empty() {
            return self.unchanged();
        }
        let offset = offset.min(segment::total_len(&self.pieces));
        let style = segment::style_at(&self.pieces, offset);
        let mut candidate = self.pieces.clone();
        let idx = segment::split_boundary(&mut candidate, offset);
        let inserted = pieces_from_text(text, &style);
        candidate.splice(idx..idx, inserted);
        self.commit(candidate)
    }

    /// Clipboard insertion. Pasted content enters the model as literal text
    /// runs (newlines become breaks), so it can never introduce markup
    /// outside the canonical grammar.
    pub fn paste(&mut self, offset: usize, clipboard: &str) -> EditOutcome {
        if clipboard.is_empty() {
            return self.unchanged();
        }
        let offset = offset.min(segment::total_len(&self.pieces));
        let mut candidate = self.pieces.clone();
        let idx = segment::split_boundary(&mut candidate, offset);
        let plain = TextRun::plain(String::new());
        let inserted = pieces_from_text(clipboard, &plain);
        candidate.splice(idx..idx, inserted);
        self.commit(candidate)
    }

    /// Deletes `[start, end)`. Deletions only shrink the value, so they are
    /// always accepted (a collapsed range is still a no-op).
    pub fn delete_range(&mut self, start: usize, end: usize) -> EditOutcome {
        let limit = segment::total_len(&self.pieces);
        let start = start.min(limit);
        let end = end.min(limit);
        if start >= end {
            return EditOutcome::Rejected;
        }
        let mut candidate = self.pieces.clone();
        let first = segment::split_boundary(&mut candidate, start);
        let after = segment::split_boundary(&mut candidate, end);
        candidate.drain(first..after);
        self.commit(candidate)
    }

    /// A context-menu style command against the current selection. Collapsed
    /// or absent selections and dropped command inputs are no-ops.
    pub fn apply_style(&mut self, start: usize, end: usize, command: &StyleCommand) -> EditOutcome {
        let mut candidate = self.pieces.clone();
        if !selection::apply_command(&mut candidate, start, end, command, &self.config) {
            return EditOutcome::Rejected;
        }
        self.commit(candidate)
    }

    fn commit(&mut self, mut candidate: Vec<Piece>) -> EditOutcome {
        segment::merge_adjacent(&mut candidate);
        // Run text is content: skip the legacy pre-pass so literal brackets
        // are never reinterpreted as markup on re-serialization.
        let canonical = serialize::canonicalize(&segment::rebuild(&candidate), &self.config);
        self.decide(canonical)
    }

    /// Accepted-but-unchanged, for edits that carry no content. Distinct
    /// from `Rejected`, which is reserved for reverted candidates.
    fn unchanged(&self) -> EditOutcome {
        EditOutcome::Accepted {
            value: self.value.clone(),
            length: self.length,
        }
    }

    fn decide(&mut self, canonical: String) -> EditOutcome {
        let length = plain_text_length(&canonical);
        if let Some(max) = self.max_length {
            if length > max {
                if let Some(logger) = self.debug.as_deref() {
                    logger.increment("edit.rejected_overflow", 1);
                    logger.log_event(
                        "canontext.edit",
                        &[
                            ("decision", "rejected".to_string()),
                            ("length", length.to_string()),
                            ("max", max.to_string()),
                        ],
                    );
                }
                // The surface is restored to the last accepted value; the
                // caller sees no change.
                return EditOutcome::Rejected;
            }
        }
        self.value = canonical;
        self.length = length;
        self.pieces = segment::flatten(&self.value, &self.config);
        if let Some(logger) = self.debug.as_deref() {
            logger.increment("edit.accepted", 1);
        }
        EditOutcome::Accepted {
            value: self.value.clone(),
            length,
        }
    }
}

fn pieces_from_text(text: &str, style: &TextRun) -> Vec<Piece> {
    let normalized = text.replace("\r\n", "\n");
    let mut out = Vec::new();
    for (idx, line) in normalized.split('\n').enumerate() {
        if idx > 0 {
            out.push(Piece::Break);
        }
        if !line.is_empty() {
            out.push(Piece::Run(TextRun {
                text: line.to_string(),
                ..style.clone()
            }));
        }
    }
    out
}
