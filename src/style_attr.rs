use crate::EngineConfig;
use crate::color::NormalizedColor;
use crate::fontsize::{self, clamp_px, format_px};
use lightningcss::properties::Property;
use lightningcss::properties::font::FontSize;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute};
use lightningcss::traits::ToCss;
use lightningcss::values::color::CssColor;
use lightningcss::values::length::LengthPercentage;

/// The styling a single span of text may carry. Never persisted with all
/// fields empty: an empty spec degrades to unwrapped plain text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleSpec {
    pub color: Option<NormalizedColor>,
    pub background: Option<NormalizedColor>,
    /// Canonical clamped size string, e.g. `18.4px`.
    pub font_size: Option<String>,
}

impl StyleSpec {
    /// Parses an inline `style="..."` attribute, keeping only the three
    /// properties of the canonical grammar and dropping everything the
    /// normalizers reject.
    pub fn from_inline_style(raw: &str, config: &EngineConfig) -> Self {
        let mut spec = StyleSpec::default();
        let Ok(parsed) = StyleAttribute::parse(raw, ParserOptions::default()) else {
            return spec;
        };
        apply_properties(&parsed.declarations.declarations, &mut spec, config);
        apply_properties(
            &parsed.declarations.important_declarations,
            &mut spec,
            config,
        );
        spec
    }

    /// Legacy `<font color=... size=...>` attributes, the pre-span styling
    /// vehicle still accepted on input.
    pub fn from_font_attrs(
        color_attr: Option<&str>,
        size_attr: Option<&str>,
        config: &EngineConfig,
    ) -> Self {
        let mut spec = StyleSpec::default();
        if let Some(raw) = color_attr {
            spec.color = NormalizedColor::parse(raw, config);
        }
        if let Some(raw) = size_attr {
            spec.font_size = fontsize::legacy_scale_px(raw)
                .map(|px| format_px(clamp_px(px, config)));
        }
        spec
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.background.is_none() && self.font_size.is_none()
    }

    /// Copies the properties set on `other` over this spec, leaving the rest
    /// untouched. Used both for nested-span inheritance and for merging a
    /// style command into an existing span.
    pub fn overlay(&mut self, other: &StyleSpec) {
        if let Some(color) = &other.color {
            self.color = Some(color.clone());
        }
        if let Some(background) = &other.background {
            self.background = Some(background.clone());
        }
        if let Some(size) = &other.font_size {
            self.font_size = Some(size.clone());
        }
    }

    /// The canonical style attribute value: fixed property order, each
    /// property at most once, semicolon-joined. `None` when nothing survived.
    pub fn to_css(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if let Some(color) = &self.color {
            parts.push(format!("color:{}", color.as_css()));
        }
        if let Some(background) = &self.background {
            parts.push(format!("background-color:{}", background.as_css()));
        }
        if let Some(size) = &self.font_size {
            parts.push(format!("font-size:{}", size));
        }
        Some(parts.join(";"))
    }
}

fn apply_properties(props: &[Property], spec: &mut StyleSpec, config: &EngineConfig) {
    for prop in props {
        match prop {
            Property::Color(color) => {
                if let Some(normalized) = normalize_css_color(color, config) {
                    spec.color = Some(normalized);
                }
            }
            Property::BackgroundColor(color) => {
                if let Some(normalized) = normalize_css_color(color, config) {
                    spec.background = Some(normalized);
                }
            }
            Property::Background(background) => {
                // Pasted markup often uses the shorthand; accept it when the
                // whole value is just a color.
                if let Ok(raw) = background.to_css_string(PrinterOptions::default()) {
                    if let Some(normalized) = NormalizedColor::parse(&raw, config) {
                        spec.background = Some(normalized);
                    }
                }
            }
            Property::FontSize(size) => {
                if let FontSize::Length(LengthPercentage::Dimension(length)) = size {
                    if let Some(px) = length.to_px() {
                        spec.font_size = Some(format_px(clamp_px(px, config)));
                    }
                }
            }
            _ => {}
        }
    }
}

fn normalize_css_color(color: &CssColor, config: &EngineConfig) -> Option<NormalizedColor> {
    if let CssColor::RGBA(rgba) = color {
        return NormalizedColor::from_rgba_channels(
            rgba.red, rgba.green, rgba.blue, rgba.alpha, config,
        );
    }
    // Lab/LCH and friends: fall back to the printed form and let the string
    // normalizer decide (it will usually drop them, which is the contract).
    let raw = color.to_css_string(PrinterOptions::default()).ok()?;
    NormalizedColor::parse(&raw, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::standard()
    }

    #[test]
    fn inline_style_extracts_all_three_properties() {
        let spec = StyleSpec::from_inline_style(
            "color: #ff0000; background-color: rgba(0, 0, 0, 0.5); font-size: 18.36px",
            &config(),
        );
        assert_eq!(
            spec.to_css().as_deref(),
            Some("color:#ff0000;background-color:rgba(0, 0, 0, 0.5);font-size:18.4px")
        );
    }

    #[test]
    fn unknown_properties_and_colors_are_dropped() {
        let spec = StyleSpec::from_inline_style(
            "color: #123456; text-decoration: underline; font-weight: bold",
            &config(),
        );
        assert!(spec.is_empty(), "nothing should survive: {:?}", spec);
        assert_eq!(spec.to_css(), None);
    }

    #[test]
    fn named_color_resolves_through_the_parser() {
        let spec = StyleSpec::from_inline_style("color: red", &config());
        assert_eq!(spec.to_css().as_deref(), Some("color:#ff0000"));
    }

    #[test]
    fn canonical_css_reparses_to_the_same_spec() {
        let cfg = config();
        let spec = StyleSpec::from_inline_style(
            "font-size: 100px; color: rgb(0,0,0); background-color: #fff",
            &cfg,
        );
        let css = spec.to_css().expect("style survives");
        let reparsed = StyleSpec::from_inline_style(&css, &cfg);
        assert_eq!(spec, reparsed);
    }

    #[test]
    fn font_attrs_convert_scale_and_color() {
        let spec = StyleSpec::from_font_attrs(Some("red"), Some("3"), &config());
        assert_eq!(
            spec.to_css().as_deref(),
            Some("color:#ff0000;font-size:14px")
        );
    }

    #[test]
    fn relative_font_sizes_are_dropped() {
        let spec = StyleSpec::from_inline_style("font-size: 1.2em", &config());
        assert!(spec.font_size.is_none());
    }

    #[test]
    fn overlay_only_touches_set_properties() {
        let cfg = config();
        let mut base = StyleSpec::from_inline_style("color: #ff0000; font-size: 12px", &cfg);
        let patch = StyleSpec::from_inline_style("font-size: 20px", &cfg);
        base.overlay(&patch);
        assert_eq!(
            base.to_css().as_deref(),
            Some("color:#ff0000;font-size:20px")
        );
    }

    #[test]
    fn malformed_style_attribute_degrades_to_empty() {
        let spec = StyleSpec::from_inline_style("color {{{", &config());
        assert!(spec.is_empty());
    }
}
