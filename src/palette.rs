/// The fixed picker palette: every opaque color the engine will persist.
/// Ten grayscale steps, ten saturated hues, six light-to-dark tint rows, and
/// the classic CSS-named colors that the context-menu picker also offers.
/// Anything outside this set (and not translucent) is dropped at
/// normalization time.
pub const PALETTE: [&str; 99] = [
    // grayscale
    "#000000", "#434343", "#666666", "#999999", "#b7b7b7", "#cccccc", "#d9d9d9", "#efefef",
    "#f3f3f3", "#ffffff",
    // saturated hues
    "#980000", "#ff0000", "#ff9900", "#ffff00", "#00ff00", "#00ffff", "#4a86e8", "#0000ff",
    "#9900ff", "#ff00ff",
    // tint rows, light to dark
    "#e6b8af", "#f4cccc", "#fce5cd", "#fff2cc", "#d9ead3", "#d0e0e3", "#c9daf8", "#cfe2f3",
    "#d9d2e9", "#ead1dc",
    "#dd7e6b", "#ea9999", "#f9cb9c", "#ffe599", "#b6d7a8", "#a2c4c9", "#a4c2f4", "#9fc5e8",
    "#b4a7d6", "#d5a6bd",
    "#cc4125", "#e06666", "#f6b26b", "#ffd966", "#93c47d", "#76a5af", "#6d9eeb", "#6fa8dc",
    "#8e7cc3", "#c27ba0",
    "#a61c00", "#cc0000", "#e69138", "#f1c232", "#6aa84f", "#45818e", "#3c78d8", "#3d85c6",
    "#674ea7", "#a64d79",
    "#85200c", "#990000", "#b45f06", "#bf9000", "#38761d", "#134f5c", "#1155cc", "#0b5394",
    "#351c75", "#741b47",
    "#5b0f00", "#660000", "#783f04", "#7f6000", "#274e13", "#0c343d", "#1c4587", "#073763",
    "#20124d", "#4c1130",
    // CSS-named picker entries
    "#800000", "#808000", "#008000", "#800080", "#008080", "#000080", "#c0c0c0", "#808080",
    "#ffa500", "#a52a2a", "#ffc0cb", "#ffd700", "#f0e68c", "#e6e6fa", "#add8e6", "#90ee90",
    "#fa8072", "#d2691e", "#4b0082",
];

/// Color names the legacy markup and pasted inline styles are allowed to use.
/// Each maps onto a palette entry.
pub(crate) const NAMED_COLORS: [(&str, &str); 22] = [
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("lime", "#00ff00"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("aqua", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("fuchsia", "#ff00ff"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("silver", "#c0c0c0"),
    ("maroon", "#800000"),
    ("olive", "#808000"),
    ("purple", "#800080"),
    ("teal", "#008080"),
    ("navy", "#000080"),
    ("orange", "#ffa500"),
    ("brown", "#a52a2a"),
    ("pink", "#ffc0cb"),
];

pub(crate) fn named_color_hex(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(named, _)| *named == lower)
        .map(|(_, hex)| *hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_entries_are_lowercase_six_digit_hex() {
        for entry in PALETTE {
            assert_eq!(entry.len(), 7, "bad palette entry length: {entry}");
            assert!(entry.starts_with('#'), "missing # in {entry}");
            assert!(
                entry[1..]
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
                "palette entry not lowercase hex: {entry}"
            );
        }
    }

    #[test]
    fn palette_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for entry in PALETTE {
            assert!(seen.insert(entry), "duplicate palette entry: {entry}");
        }
    }

    #[test]
    fn every_named_color_is_in_palette() {
        for (name, hex) in NAMED_COLORS {
            assert!(
                PALETTE.contains(&hex),
                "named color {name} maps to {hex} which is not in the palette"
            );
        }
    }
}
