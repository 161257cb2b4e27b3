//! Rule thresholds, loaded from YAML.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric thresholds consumed by the rules.
///
/// Missing keys take their default value, so a config file only needs to
/// list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Movement tolerance between slides, as a fraction of slide width/height.
    pub shape_pos_threshold: f64,
    pub shape_min_color_contrast_ratio: f64,
    pub font_min_color_contrast_ratio: f64,
    /// Smallest acceptable body font size, in points.
    pub min_size_font: f64,
    /// Thinnest acceptable line, in points.
    pub min_line_width: f64,
    pub max_num_words_per_slide: usize,
    pub seconds_per_word: f64,
    pub seconds_per_pause: f64,
    pub seconds_per_break: f64,
    pub seconds_between_slides: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shape_pos_threshold: 0.05,
            shape_min_color_contrast_ratio: 1.5,
            font_min_color_contrast_ratio: 4.5,
            min_size_font: 18.0,
            min_line_width: 1.0,
            max_num_words_per_slide: 50,
            seconds_per_word: 0.4,
            seconds_per_pause: 0.5,
            seconds_per_break: 2.0,
            seconds_between_slides: 2.0,
        }
    }
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        log::debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Reject values no rule can work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.shape_pos_threshold) {
            return Err(Error::InvalidConfig {
                key: "shape_pos_threshold",
                reason: format!("{} is not a fraction in [0, 1]", self.shape_pos_threshold),
            });
        }

        let non_negative = [
            ("shape_min_color_contrast_ratio", self.shape_min_color_contrast_ratio),
            ("font_min_color_contrast_ratio", self.font_min_color_contrast_ratio),
            ("min_size_font", self.min_size_font),
            ("min_line_width", self.min_line_width),
            ("seconds_per_word", self.seconds_per_word),
            ("seconds_per_pause", self.seconds_per_pause),
            ("seconds_per_break", self.seconds_per_break),
            ("seconds_between_slides", self.seconds_between_slides),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    key,
                    reason: format!("{} must be a non-negative number", value),
                });
            }
        }

        Ok(())
    }
}
