//! HTML report output.
//!
//! Renders a [`FeedbackModel`] as a standalone page: deck-level verdict and
//! advice first, then one card per slide with its timing and findings.

use crate::feedback::FeedbackModel;
use std::fmt::Write;

/// Renderer for the feedback web page.
#[derive(Debug, Clone)]
pub struct HtmlReport {
    /// Page title.
    title: String,
    /// Whether slides without findings get a card.
    show_clean_slides: bool,
}

impl Default for HtmlReport {
    fn default() -> Self {
        Self {
            title: "Presentation feedback".to_string(),
            show_clean_slides: true,
        }
    }
}

impl HtmlReport {
    /// Create a renderer with the default title, listing every slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title (usually the deck file name).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Only render slides that have findings.
    pub fn with_show_clean_slides(mut self, show: bool) -> Self {
        self.show_clean_slides = show;
        self
    }

    /// Render the full page.
    pub fn render(&self, model: &FeedbackModel) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_html(&self.title));
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<h1>{}</h1>", escape_html(&self.title));

        let (class, verdict) = if model.passed {
            ("pass", "All checks passed.")
        } else {
            ("fail", "Some checks failed.")
        };
        let _ = writeln!(html, "<p class=\"{}\">{}</p>", class, verdict);

        match &model.total_time {
            Some(total) => {
                let _ = writeln!(html, "<p>Estimated total time: {}</p>", total);
            }
            None => html.push_str(
                "<p>Cannot estimate presentation time without speaker notes.</p>\n",
            ),
        }

        if !model.general_feedback.is_empty() {
            // Deck-level advice is generated HTML, not user text.
            let _ = writeln!(html, "<div class=\"general\">{}</div>", model.general_feedback);
        }

        for (i, feedback) in model.slide_feedback.iter().enumerate() {
            if feedback.is_empty() && !self.show_clean_slides {
                continue;
            }
            html.push_str(&self.render_slide(model, i, feedback));
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_slide(&self, model: &FeedbackModel, index: usize, feedback: &str) -> String {
        let mut card = String::from("<div class=\"slide\">\n");
        let _ = write!(card, "<h2>Slide {}", model.start_slide_num + index);

        let at = model.cumul_slide_times.as_ref().and_then(|t| t.get(index));
        let duration = model.slide_times.as_ref().and_then(|t| t.get(index));
        if let (Some(at), Some(duration)) = (at, duration) {
            let _ = write!(card, " <span class=\"time\">starts {}, lasts {}</span>", at, duration);
        }
        card.push_str("</h2>\n");

        if feedback.is_empty() {
            card.push_str("<p class=\"pass\">No issues.</p>\n");
        } else {
            let _ = writeln!(card, "<p>{}</p>", findings_to_html(feedback));
        }

        card.push_str("</div>\n");
        card
    }
}

const STYLE: &str = "<style>\n\
body { font-family: sans-serif; max-width: 60em; margin: 2em auto; }\n\
.slide { border: 1px solid #ccc; border-radius: 4px; padding: 0 1em; margin: 1em 0; }\n\
.pass { color: #1a7f37; }\n\
.fail { color: #cf222e; }\n\
.time { font-size: 0.7em; color: #57606a; font-weight: normal; }\n\
</style>\n";

/// Escape text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape newline-joined findings and turn the newlines into `<br>`.
pub fn findings_to_html(findings: &str) -> String {
    findings
        .split('\n')
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>")
}
