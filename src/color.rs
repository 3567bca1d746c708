use crate::EngineConfig;
use crate::palette::named_color_hex;

/// A color that survived normalization: either an opaque palette hex value or
/// a translucent `rgba(...)` kept because opacity cannot be expressed as hex.
/// Both shapes are lower-case and stable under re-normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedColor {
    Hex(String),
    Rgba(String),
}

impl NormalizedColor {
    /// Normalizes any supported CSS color representation against the
    /// configured palette. Unrecognized or out-of-palette colors yield `None`
    /// and are silently dropped by the caller.
    pub fn parse(raw: &str, config: &EngineConfig) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if s.starts_with('#') {
            return from_hex(s, config);
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
            return from_rgb_function(&lower, config);
        }
        let hex = named_color_hex(&lower)?;
        if config.palette_contains(hex) {
            return Some(NormalizedColor::Hex(hex.to_string()));
        }
        None
    }

    /// Builds a normalized color from 8-bit channels, e.g. out of a
    /// lightningcss `RGBA` value.
    pub(crate) fn from_rgba_channels(
        r: u8,
        g: u8,
        b: u8,
        a: u8,
        config: &EngineConfig,
    ) -> Option<Self> {
        if a < 255 {
            return Some(NormalizedColor::Rgba(format!(
                "rgba({r}, {g}, {b}, {})",
                format_alpha(a)
            )));
        }
        let hex = format!("#{r:02x}{g:02x}{b:02x}");
        if config.palette_contains(&hex) {
            Some(NormalizedColor::Hex(hex))
        } else {
            None
        }
    }

    pub fn as_css(&self) -> &str {
        match self {
            NormalizedColor::Hex(value) => value,
            NormalizedColor::Rgba(value) => value,
        }
    }

    pub fn is_translucent(&self) -> bool {
        matches!(self, NormalizedColor::Rgba(_))
    }
}

fn from_hex(s: &str, config: &EngineConfig) -> Option<NormalizedColor> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    // 3/4-digit shorthand expands by doubling each nibble.
    let expanded = match digits.len() {
        3 | 4 => {
            let mut out = String::with_capacity(8);
            for ch in digits.chars() {
                out.push(ch);
                out.push(ch);
            }
            out
        }
        6 | 8 => digits.to_string(),
        _ => return None,
    };
    let expanded = expanded.to_ascii_lowercase();

    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    let a = if expanded.len() == 8 {
        u8::from_str_radix(&expanded[6..8], 16).ok()?
    } else {
        255
    };
    NormalizedColor::from_rgba_channels(r, g, b, a, config)
}

fn from_rgb_function(lower: &str, config: &EngineConfig) -> Option<NormalizedColor> {
    let inner = lower
        .trim_start_matches("rgba(")
        .trim_start_matches("rgb(")
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(|p| p.trim()).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    let r = parse_channel(parts[0])?;
    let g = parse_channel(parts[1])?;
    let b = parse_channel(parts[2])?;
    let a = if parts.len() == 4 {
        let alpha = parts[3].parse::<f32>().ok()?;
        if !alpha.is_finite() {
            return None;
        }
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    NormalizedColor::from_rgba_channels(r, g, b, a, config)
}

fn parse_channel(part: &str) -> Option<u8> {
    let value = part.parse::<f32>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.clamp(0.0, 255.0).round() as u8)
}

/// Formats an 8-bit alpha the way cssparser serializes it: two decimal
/// places if that round-trips to the same 8-bit value, three otherwise.
/// Matching that rounding keeps values stable once they have passed through
/// the inline-style parser.
fn format_alpha(a: u8) -> String {
    let alpha = a as f32 / 255.0;
    let mut rounded = (alpha * 100.0).round() / 100.0;
    if (rounded * 255.0).round() as u8 != a {
        rounded = (alpha * 1000.0).round() / 1000.0;
    }
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::standard()
    }

    #[test]
    fn rgb_function_converts_to_palette_hex() {
        let color = NormalizedColor::parse("rgb(0, 0, 0)", &config()).expect("black");
        assert_eq!(color.as_css(), "#000000");
    }

    #[test]
    fn translucent_rgba_is_preserved() {
        let color = NormalizedColor::parse("rgba(255,0,0,0.5)", &config()).expect("rgba");
        assert_eq!(color.as_css(), "rgba(255, 0, 0, 0.5)");
        assert!(color.is_translucent());
    }

    #[test]
    fn translucent_normalization_is_idempotent() {
        let cfg = config();
        let first = NormalizedColor::parse("rgba(0, 0, 0, .33)", &cfg).expect("rgba");
        let again = NormalizedColor::parse(first.as_css(), &cfg).expect("rgba roundtrip");
        assert_eq!(first, again);
    }

    #[test]
    fn shorthand_hex_expands() {
        let color = NormalizedColor::parse("#f00", &config()).expect("red shorthand");
        assert_eq!(color.as_css(), "#ff0000");
    }

    #[test]
    fn eight_digit_hex_with_alpha_becomes_rgba() {
        let color = NormalizedColor::parse("#ff000080", &config()).expect("hex alpha");
        assert_eq!(color.as_css(), "rgba(255, 0, 0, 0.5)");
    }

    #[test]
    fn named_colors_resolve_to_palette() {
        let color = NormalizedColor::parse("Black", &config()).expect("named black");
        assert_eq!(color.as_css(), "#000000");
        let color = NormalizedColor::parse("orange", &config()).expect("named orange");
        assert_eq!(color.as_css(), "#ffa500");
    }

    #[test]
    fn out_of_palette_and_garbage_colors_drop() {
        let cfg = config();
        assert!(NormalizedColor::parse("#123456", &cfg).is_none());
        assert!(NormalizedColor::parse("rebeccapurple", &cfg).is_none());
        assert!(NormalizedColor::parse("rgb(1,2)", &cfg).is_none());
        assert!(NormalizedColor::parse("not-a-color", &cfg).is_none());
        assert!(NormalizedColor::parse("", &cfg).is_none());
    }

    #[test]
    fn uppercase_hex_lowers() {
        let color = NormalizedColor::parse("#FF0000", &config()).expect("uppercase hex");
        assert_eq!(color.as_css(), "#ff0000");
    }
}
