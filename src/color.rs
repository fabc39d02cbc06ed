use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Curve;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            [rgb.red, rgb.green, rgb.blue]
        })
        .collect()
}

/// `#rrggbb` notation.
pub fn to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex(text: &str) -> Option<[u8; 3]> {
    let digits = text.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Give every curve that has no colour yet a distinct one.
pub fn assign_colors(curves: &mut [Curve]) {
    let palette = generate_palette(curves.len());
    for (curve, rgb) in curves.iter_mut().zip(palette) {
        if curve.style.color.is_none() {
            curve.style.color = Some(to_hex(rgb));
        }
    }
}
