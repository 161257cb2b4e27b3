//! WASM-compatible wrapper for deck checking.
//!
//! Exposes the rule engine to JavaScript for use in Cloudflare Workers:
//! the caller hands over the raw `.pptx` bytes and optionally a YAML
//! configuration, and gets the feedback model back.

use deckcheck_core::{Config, FeedbackModel, HtmlReport, RuleEngine};
use deckcheck_pptx::PptxParser;
use std::io::Cursor;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Check a presentation.
///
/// # Arguments
/// * `data` - The raw bytes of the PPTX file
/// * `config_yaml` - Optional YAML thresholds; missing keys use the defaults
///
/// # Returns
/// The feedback model as a JavaScript object, or throws on error.
#[wasm_bindgen]
pub fn check_presentation(data: &[u8], config_yaml: Option<String>) -> Result<JsValue, JsValue> {
    let model = check_presentation_impl(data, config_yaml.as_deref()).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&model)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Check a presentation and render the feedback as an HTML page.
#[wasm_bindgen]
pub fn render_report(
    data: &[u8],
    config_yaml: Option<String>,
    title: Option<String>,
) -> Result<String, JsValue> {
    let model = check_presentation_impl(data, config_yaml.as_deref()).map_err(|e| JsValue::from_str(&e))?;

    let report = match title {
        Some(title) if !title.is_empty() => HtmlReport::new().with_title(title),
        _ => HtmlReport::new(),
    };
    Ok(report.render(&model))
}

/// The default thresholds, as a JavaScript object.
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&Config::default())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn check_presentation_impl(data: &[u8], config_yaml: Option<&str>) -> Result<FeedbackModel, String> {
    let config = match config_yaml {
        Some(yaml) => Config::from_yaml_str(yaml).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    let deck = PptxParser::new()
        .parse(Cursor::new(data))
        .map_err(|e| format!("PPTX parsing error: {}", e))?;

    Ok(RuleEngine::new(config).evaluate(&deck))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn single_slide_deck() -> Vec<u8> {
        let parts = [
            (
                "ppt/presentation.xml",
                r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst><p:sldId id="256" r:id="rId1"/></p:sldIdLst></p:presentation>"#,
            ),
            (
                "ppt/_rels/presentation.xml.rels",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/></Relationships>"#,
            ),
            (
                "ppt/slides/slide1.xml",
                r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:p><a:r><a:t>Summary</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            ),
        ];

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_check_single_slide() {
        let model = check_presentation_impl(&single_slide_deck(), None).unwrap();
        assert_eq!(model.slide_feedback, vec![String::new()]);
        assert_eq!(model.general_feedback, "");
        assert!(model.passed);
    }

    #[test]
    fn test_config_is_applied() {
        let model = check_presentation_impl(&single_slide_deck(), Some("max_num_words_per_slide: 0\n")).unwrap();
        assert_eq!(model.slide_feedback.len(), 1);

        let err = check_presentation_impl(&single_slide_deck(), Some("shape_pos_threshold: 2\n")).unwrap_err();
        assert!(err.contains("shape_pos_threshold"));
    }

    #[test]
    fn test_invalid_data() {
        let err = check_presentation_impl(b"definitely not a pptx", None).unwrap_err();
        assert!(err.starts_with("PPTX parsing error"));
    }
}
