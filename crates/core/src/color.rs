//! Color resolution against the deck theme and WCAG contrast ratios.

use crate::types::{ColorRef, ColorScheme, Fill, Rgb, ThemeColor};

/// Contrast ratio of two identical colors.
pub const MIN_CONTRAST_RATIO: f64 = 1.0;

/// Contrast ratio of black on white.
pub const MAX_CONTRAST_RATIO: f64 = 21.0;

/// Resolve a color reference to RGB using the deck's scheme.
///
/// Unspecified colors fall back to the primary dark text role; roles missing
/// from the scheme fall back to the default Office theme.
pub fn resolve(scheme: &ColorScheme, color: &ColorRef) -> Rgb {
    match *color {
        ColorRef::Rgb(rgb) => rgb,
        ColorRef::Theme { color, brightness } => {
            adjust_brightness(scheme_color(scheme, color), brightness)
        }
        ColorRef::Unspecified => scheme_color(scheme, ThemeColor::Dark1),
    }
}

/// Resolve a slide background, treating anything but a solid fill as white.
pub fn resolve_background(scheme: &ColorScheme, fill: Option<&Fill>) -> Rgb {
    match fill {
        Some(Fill::Solid(color)) => resolve(scheme, color),
        _ => Rgb::WHITE,
    }
}

fn scheme_color(scheme: &ColorScheme, role: ThemeColor) -> Rgb {
    scheme
        .get(role)
        .or_else(|| ColorScheme::default().get(role))
        .unwrap_or(Rgb::BLACK)
}

/// Lighten toward white (`brightness > 0`) or darken toward black (`< 0`).
pub fn adjust_brightness(base: Rgb, brightness: f64) -> Rgb {
    let brightness = brightness.clamp(-1.0, 1.0);
    let channel = |c: u8| -> u8 {
        let c = f64::from(c);
        let adjusted = if brightness > 0.0 {
            c + (255.0 - c) * brightness
        } else {
            c * (1.0 + brightness)
        };
        adjusted.round().clamp(0.0, 255.0) as u8
    };
    if brightness == 0.0 {
        return base;
    }
    Rgb::new(channel(base.r), channel(base.g), channel(base.b))
}

/// WCAG relative luminance in [0, 1].
pub fn relative_luminance(color: Rgb) -> f64 {
    let linear = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(color.r) + 0.7152 * linear(color.g) + 0.0722 * linear(color.b)
}

/// WCAG contrast ratio in [1, 21]; symmetric in its arguments.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    if a == b {
        return MIN_CONTRAST_RATIO;
    }
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    ((lighter + 0.05) / (darker + 0.05)).clamp(MIN_CONTRAST_RATIO, MAX_CONTRAST_RATIO)
}

/// Whether a ratio is below `minimum`.
///
/// A ratio of exactly 1 means the element blends into its background on
/// purpose and is never reported.
pub fn is_insufficient(ratio: f64, minimum: f64) -> bool {
    ratio < minimum && ratio != MIN_CONTRAST_RATIO
}
