use crate::EngineConfig;

/// Normalizes a CSS font-size string to the canonical clamped `px` form.
/// Anything without an extractable px magnitude is dropped.
pub fn normalize_font_size(raw: &str, config: &EngineConfig) -> Option<String> {
    let s = raw.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }
    let number = s.strip_suffix("px").map(str::trim_end).unwrap_or(&s);
    let value = number.parse::<f32>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(format_px(clamp_px(value, config)))
}

/// Legacy `<font size="1..7">` scale, converted to pixels before clamping.
pub(crate) fn legacy_scale_px(size_attr: &str) -> Option<f32> {
    let scale = size_attr.trim().parse::<i32>().ok()?;
    let scale = scale.clamp(1, 7);
    Some(8.0 + scale as f32 * 2.0)
}

pub(crate) fn clamp_px(value: f32, config: &EngineConfig) -> f32 {
    value.clamp(config.font_size_min, config.font_size_max)
}

/// One-decimal rounding with the trailing `.0` omitted, so a value formats
/// the same way no matter how many times it re-enters the pipeline.
pub(crate) fn format_px(value: f32) -> String {
    let tenths = (value * 10.0).round() as i64;
    if tenths % 10 == 0 {
        format!("{}px", tenths / 10)
    } else {
        format!("{}.{}px", tenths / 10, (tenths % 10).abs())
    }
}
