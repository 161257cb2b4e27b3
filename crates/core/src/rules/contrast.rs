//! Readability of shapes, lines and fonts against their background.

use crate::color::{
    contrast_ratio, is_insufficient, resolve, resolve_background, MIN_CONTRAST_RATIO,
};
use crate::feedback::SlideFeedback;
use crate::rules::RuleContext;
use crate::types::{Fill, Rgb, Shape, ShapeKind, TextRun};

/// Runs smaller than this many points below the minimum are always flagged.
const FONT_SIZE_HARD_MARGIN: f64 = 6.0;

/// Check colors, line widths and font sizes on every in-scope slide.
pub fn has_readable_colors_and_fonts(ctx: &RuleContext<'_>, feedback: &mut SlideFeedback) -> bool {
    let scheme = &ctx.deck.color_scheme;
    let mut result = true;

    for (index, slide) in ctx.slides().iter().enumerate() {
        let background = resolve_background(scheme, slide.background.as_ref());

        for shape in &slide.shapes {
            let findings = check_shape(ctx, shape, background);
            if !findings.is_empty() {
                result = false;
            }
            for finding in findings {
                feedback.push(index, finding);
            }
        }
    }

    result
}

/// All findings for one shape on a slide with the given background.
fn check_shape(ctx: &RuleContext<'_>, shape: &Shape, background: Rgb) -> Vec<String> {
    let config = ctx.config;
    let scheme = &ctx.deck.color_scheme;
    let mut findings = Vec::new();

    if matches!(
        shape.kind,
        ShapeKind::Picture | ShapeKind::Chart | ShapeKind::Table
    ) {
        return findings;
    }

    if shape.kind == ShapeKind::Line {
        if let Some(width) = shape.line_width {
            if width < config.min_line_width {
                findings.push(format!(
                    "🔎 Line width for {} is too small to be seen at {} pts.",
                    shape.descriptor(),
                    width
                ));
            }
        }
    }

    let Some(fill) = shape.fill else {
        return findings;
    };

    let mut text_background = background;
    if let Fill::Solid(color) = fill {
        let fill_rgb = resolve(scheme, &color);
        let ratio = contrast_ratio(background, fill_rgb);
        if is_insufficient(ratio, config.shape_min_color_contrast_ratio) && !shape.is_rectangle() {
            findings.push(format!(
                "🌈 Colour contrast for {} is not sufficient from the slide background colour.",
                shape.descriptor()
            ));
        }
        text_background = fill_rgb;
    }

    if shape.kind == ShapeKind::Line {
        return findings;
    }
    let Some(frame) = &shape.text_frame else {
        return findings;
    };

    let mut low_contrast = Vec::new();
    let mut any_readable = false;

    for run in frame.text_runs() {
        if is_too_small(run, config.min_size_font) {
            findings.push(format!(
                "🗚 Font size for text '{}' in shape {} is too small.",
                run.text,
                shape.descriptor()
            ));
        }

        if run.text.is_empty() {
            continue;
        }

        let font_rgb = resolve(scheme, &run.color);
        let ratio = contrast_ratio(text_background, font_rgb);
        // Hidden text neither counts as readable nor gets reported.
        if ratio == MIN_CONTRAST_RATIO {
            continue;
        }
        if is_insufficient(ratio, config.font_min_color_contrast_ratio) && !any_readable {
            low_contrast.push(format!(
                "🌈 Font colour contrast for text '{}' in shape {} is not sufficient from the background colour.",
                run.text,
                shape.descriptor()
            ));
        } else {
            any_readable = true;
        }
    }

    // Greyed-out items next to readable text are intentional.
    if !any_readable {
        findings.extend(low_contrast);
    }

    findings
}

/// Body text under the minimum size, or any text far below it. Footnotes
/// starting with `*` and short labels get the softer limit.
fn is_too_small(run: &TextRun, min_size_font: f64) -> bool {
    let Some(size) = run.font_size else {
        return false;
    };
    let long_body = run.text.split_whitespace().count() > 2 && !run.text.starts_with('*');
    (size < min_size_font && long_body) || size < min_size_font - FONT_SIZE_HARD_MARGIN
}
