mod color;
mod debug;
mod editor;
mod error;
mod fontsize;
mod legacy;
mod palette;
mod plain;
mod segment;
mod selection;
mod serialize;
mod style_attr;

pub use color::NormalizedColor;
use debug::DebugLogger;
pub use editor::{EditOutcome, Editor};
pub use error::CanonTextError;
pub use palette::PALETTE;
pub use selection::StyleCommand;
pub use style_attr::StyleSpec;
use std::sync::Arc;

/// Engine configuration: the color palette and font-size bounds every
/// normalizer consults. Owned by the engine and threaded explicitly; there
/// is no process-wide state.
pub struct EngineConfig {
    palette: Vec<String>,
    pub(crate) font_size_min: f32,
    pub(crate) font_size_max: f32,
}

impl EngineConfig {
    pub(crate) fn standard() -> Self {
        EngineConfig {
            palette: PALETTE.iter().map(|entry| entry.to_string()).collect(),
            font_size_min: 10.0,
            font_size_max: 36.0,
        }
    }

    pub(crate) fn palette_contains(&self, hex: &str) -> bool {
        self.palette.iter().any(|entry| entry == hex)
    }
}

/// The rich-text canonicalization engine. Converts arbitrary
/// contenteditable-produced markup, legacy bracket markup, or empty input
/// into one fixed canonical HTML dialect, and answers the plain-text-length
/// question every surrounding field validator asks.
///
/// The canonical grammar is `br`, `strong`, `em`, and
/// `span[style=color|background-color|font-size]` over escaped text; it is
/// both the steady-state output and the only thing ever persisted.
pub struct CanonText {
    config: Arc<EngineConfig>,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Clone, Default)]
pub struct CanonTextBuilder {
    palette: Option<Vec<String>>,
    font_size_min: Option<f32>,
    font_size_max: Option<f32>,
    debug_path: Option<std::path::PathBuf>,
}

impl CanonText {
    pub fn builder() -> CanonTextBuilder {
        CanonTextBuilder::default()
    }

    /// Normalizes any supported input into the canonical dialect.
    /// Idempotent: `normalize(normalize(v)) == normalize(v)` for every `v`.
    pub fn normalize(&self, value: Option<&str>) -> String {
        let out = serialize::normalize_with(value, &self.config);
        if let Some(logger) = self.debug.as_deref() {
            logger.increment("normalize.calls", 1);
            if value.map(|v| !v.is_empty()).unwrap_or(false) && out.is_empty() {
                logger.increment("normalize.coerced_empty", 1);
            }
        }
        out
    }

    /// The user-visible text of a canonical value: breaks become newlines,
    /// markup is stripped, entities read back as the characters they encode.
    pub fn extract_plain_text(&self, value: &str) -> String {
        plain::extract_plain_text(value)
    }

    /// User-visible character count of a canonical value; the number every
    /// field-level length validator compares against its limit.
    pub fn plain_text_length(&self, value: &str) -> usize {
        plain::plain_text_length(value)
    }

    /// Clamps and formats a standalone CSS font-size the way span styles are
    /// normalized; `None` when no pixel magnitude can be extracted.
    pub fn normalize_font_size(&self, raw: &str) -> Option<String> {
        fontsize::normalize_font_size(raw, &self.config)
    }

    /// The emptiness check used by required-field validation. A value that
    /// holds only line breaks or whitespace is blank.
    pub fn is_blank(&self, value: &str) -> bool {
        plain::is_blank(value)
    }

    /// Creates a controller for one editable surface, seeded with an
    /// external value and an optional hard length ceiling.
    pub fn editor(&self, initial: Option<&str>, max_length: Option<usize>) -> Editor {
        Editor::new(
            Arc::clone(&self.config),
            self.debug.clone(),
            initial,
            max_length,
        )
    }

    /// Writes the counter summary to the debug log, when one is configured.
    pub fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }
}

impl CanonTextBuilder {
    /// Replaces the built-in picker palette. Entries must be 6-digit hex
    /// colors; they are lower-cased on the way in.
    pub fn palette(mut self, entries: impl IntoIterator<Item = String>) -> Self {
        self.palette = Some(entries.into_iter().collect());
        self
    }

    /// Bounds for the font-size clamp, in pixels.
    pub fn font_size_bounds(mut self, min_px: f32, max_px: f32) -> Self {
        self.font_size_min = Some(min_px);
        self.font_size_max = Some(max_px);
        self
    }

    /// Enables the JSONL debug log at the given path.
    pub fn debug_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<CanonText, CanonTextError> {
        let mut config = EngineConfig::standard();

        if let Some(entries) = self.palette {
            if entries.is_empty() {
                return Err(CanonTextError::InvalidConfiguration(
                    "palette cannot be empty".to_string(),
                ));
            }
            let mut palette = Vec::with_capacity(entries.len());
            for entry in entries {
                let lower = entry.trim().to_ascii_lowercase();
                let valid = lower.len() == 7
                    && lower.starts_with('#')
                    && lower[1..].chars().all(|c| c.is_ascii_hexdigit());
                if !valid {
                    return Err(CanonTextError::InvalidConfiguration(format!(
                        "palette entry {:?} is not a 6-digit hex color",
                        entry
                    )));
                }
                palette.push(lower);
            }
            config.palette = palette;
        }

        if let Some(min) = self.font_size_min {
            config.font_size_min = min;
        }
        if let Some(max) = self.font_size_max {
            config.font_size_max = max;
        }
        if !config.font_size_min.is_finite()
            || !config.font_size_max.is_finite()
            || config.font_size_min <= 0.0
            || config.font_size_min > config.font_size_max
        {
            return Err(CanonTextError::InvalidConfiguration(format!(
                "font_size_bounds must satisfy 0 < min <= max (got {}..{})",
                config.font_size_min, config.font_size_max
            )));
        }

        let debug = match self.debug_path {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };

        Ok(CanonText {
            config: Arc::new(config),
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn engine() -> CanonText {
        CanonText::builder().build().expect("engine")
    }

    fn temp_log_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "canontext_{tag}_{}_{}.jsonl",
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn normalize_is_idempotent_over_representative_inputs() {
        let engine = engine();
        for input in [
            "plain",
            "[b]legacy[/b]\nline",
            "<div>Hi</div><div>there</div>",
            "<span style=\"color:rgb(255,0,0);font-size:18.36px\">styled</span>",
            "<font color=\"black\" size=\"5\">old</font>",
            "a    b<br /><br /><br />c",
            "<em>x</em><strong>y</strong>&amp;&lt;&gt;",
        ] {
            let once = engine.normalize(Some(input));
            let twice = engine.normalize(Some(&once));
            assert_eq!(once, twice, "normalize not idempotent for {input:?}");
        }
    }

    #[test]
    fn normalize_handles_null_input() {
        assert_eq!(engine().normalize(None), "");
    }

    #[test]
    fn documented_examples_hold_end_to_end() {
        let engine = engine();
        assert_eq!(
            engine.normalize(Some("[b]Hola[/b]\nMundo")),
            "<strong>Hola</strong><br />Mundo"
        );
        assert_eq!(engine.normalize(Some("a    b")), "a &nbsp;&nbsp;&nbsp;b");
        assert_eq!(engine.normalize(Some("<br /><br /><br /><br /><br />")), "<br /><br />");
        assert_eq!(engine.normalize(Some("<br />")), "");
        let length =
            engine.plain_text_length(&engine.normalize(Some("<div>Hi</div><div>there</div>")));
        assert_eq!(length, 8);
    }

    #[test]
    fn escaping_defeats_markup_injection() {
        let engine = engine();
        let out = engine.normalize(Some("<script>alert(1)</script>"));
        assert!(!out.contains('<') || !out.contains("<script"), "unsafe: {out}");
    }

    #[test]
    fn plain_length_is_independent_of_wrapper_depth() {
        let engine = engine();
        let flat = engine.normalize(Some("abc"));
        let wrapped = engine.normalize(Some(
            "<strong><em><span style=\"color:#ff0000\">abc</span></em></strong>",
        ));
        assert_eq!(
            engine.plain_text_length(&flat),
            engine.plain_text_length(&wrapped)
        );
    }

    #[test]
    fn custom_palette_restricts_colors() {
        let engine = CanonText::builder()
            .palette(["#FF0000".to_string(), "#00ff00".to_string()])
            .build()
            .expect("custom palette");
        assert_eq!(
            engine.normalize(Some("<span style=\"color:#ff0000\">x</span>")),
            "<span style=\"color:#ff0000\">x</span>"
        );
        assert_eq!(
            engine.normalize(Some("<span style=\"color:#0000ff\">x</span>")),
            "x",
            "colors outside the configured palette must drop"
        );
    }

    #[test]
    fn custom_font_size_bounds_apply() {
        let engine = CanonText::builder()
            .font_size_bounds(12.0, 24.0)
            .build()
            .expect("custom bounds");
        assert_eq!(
            engine.normalize(Some("<span style=\"font-size:100px\">x</span>")),
            "<span style=\"font-size:24px\">x</span>"
        );
    }

    #[test]
    fn builder_rejects_bad_palette_entries() {
        let err = match CanonText::builder()
            .palette(["red".to_string()])
            .build()
        {
            Ok(_) => panic!("named entries must be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, CanonTextError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("hex"));
    }

    #[test]
    fn builder_rejects_inverted_font_bounds() {
        let err = match CanonText::builder().font_size_bounds(40.0, 10.0).build() {
            Ok(_) => panic!("inverted bounds must be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, CanonTextError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("font_size_bounds"));
    }

    #[test]
    fn debug_log_records_normalize_and_edit_counters() {
        let path = temp_log_path("summary");
        let engine = CanonText::builder()
            .debug_log(&path)
            .build()
            .expect("engine with debug log");
        engine.normalize(Some("<br />"));
        let mut editor = engine.editor(Some("1234"), Some(4));
        editor.insert_text(4, "5");
        engine.emit_debug_summary("test");
        let log = std::fs::read_to_string(&path).expect("read debug log");
        assert!(log.contains("\"canontext.summary\""), "missing summary: {log}");
        assert!(log.contains("edit.rejected_overflow"), "missing counter: {log}");
        assert!(log.contains("normalize.coerced_empty"), "missing counter: {log}");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn style_merge_preserves_color_when_background_arrives() {
        let engine = engine();
        let mut editor = engine.editor(
            Some("<span style=\"color:#ff0000\">hi</span>"),
            None,
        );
        editor.apply_style(0, 2, &StyleCommand::Background("#000000".to_string()));
        assert_eq!(
            editor.value(),
            "<span style=\"color:#ff0000;background-color:#000000\">hi</span>"
        );
    }
}
