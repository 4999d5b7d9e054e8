//! Plot configuration
//!
//! Configuration is read through the `PropertyReader`: every recognized option
//! and its default is declared in corrplot.json. User values come from a
//! name -> value map, typically loaded from a JSON settings file:
//!
//! ```json
//! { "annotation.mode": "text", "significance.threshold": 0.01 }
//! ```

use crate::colors::ColorScaleKind;
use crate::error::{CorrPlotError, Result};
use crate::properties::PropertyReader;
use std::collections::HashMap;
use std::path::Path;

/// How significant cells are annotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationMode {
    /// Fixed glyph layered above the marker
    #[default]
    Marker,
    /// Formatted p-value with contrast-aware font color
    Text,
}

impl AnnotationMode {
    /// Parse from string value
    ///
    /// Validation happens in PropertyReader.get_enum()
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" => Self::Text,
            _ => Self::Marker,
        }
    }
}

/// Glyph drawn on significant cells in marker mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphKind {
    #[default]
    Star,
    Cross,
    Dot,
}

impl GlyphKind {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cross" => Self::Cross,
            "dot" => Self::Dot,
            _ => Self::Star,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrPlotConfig {
    /// Diverging (centered at 0) or sequential color scale
    pub color_scale: ColorScaleKind,

    /// Palette name from palettes.json (None = default for the scale kind)
    pub palette: Option<String>,

    /// Glyph or p-value text on significant cells
    pub annotation_mode: AnnotationMode,

    /// Cells with p-value strictly below this are annotated
    pub significance_threshold: f64,

    /// Whether diagonal (self-correlation) cells may be annotated
    pub annotate_diagonal: bool,

    /// Fraction of half a cell used as marker radius at |r| = 1, in (0, 1]
    pub marker_scale_factor: f64,

    /// Size in pixels of a newly created surface (width, height)
    pub figure_size: (u32, u32),

    /// Decimals of p-values printed in text mode
    pub text_precision: usize,

    /// Text drawn on markers with |r| above this is white, black otherwise
    pub contrast_threshold: f64,

    /// Glyph shape in marker mode
    pub glyph: GlyphKind,

    /// X-axis tick label rotation in degrees (0 = horizontal, 90 = vertical)
    pub x_tick_rotation: f64,

    /// Y-axis tick label rotation in degrees
    pub y_tick_rotation: f64,

    /// Color legend title (optional)
    pub legend_title: Option<String>,

    /// Flush the surface at the end of a render call
    pub present: bool,
}

impl CorrPlotConfig {
    /// Create config from user property values
    ///
    /// All default values come from corrplot.json via PropertyReader.
    pub fn from_properties(user_values: &HashMap<String, String>) -> Self {
        let props = PropertyReader::new(user_values);

        let color_scale = ColorScaleKind::parse(&props.get_enum("color.scale"));
        let palette = props.get_optional_string("palette");
        let annotation_mode = AnnotationMode::parse(&props.get_enum("annotation.mode"));

        // p-values live in [0, 1]; a zero threshold would never annotate anything
        let significance_threshold =
            props.get_f64_in_range("significance.threshold", f64::MIN_POSITIVE, 1.0);
        let annotate_diagonal = props.get_bool("annotate.diagonal");

        // Above 1.0 neighbouring markers at |r| = 1 would overlap
        let marker_scale_factor =
            props.get_f64_in_range("marker.scale.factor", f64::MIN_POSITIVE, 1.0);

        let width = props.get_i64_in_range("figure.width", 100, 10_000) as u32;
        let height = props.get_i64_in_range("figure.height", 100, 10_000) as u32;

        let text_precision = props.get_i64_in_range("text.precision", 0, 10) as usize;
        let contrast_threshold = props.get_f64_in_range("text.contrast.threshold", 0.0, 1.0);
        let glyph = GlyphKind::parse(&props.get_enum("glyph"));

        let x_tick_rotation = props.get_f64("axis.x.tick.rotation");
        let y_tick_rotation = props.get_f64("axis.y.tick.rotation");

        let legend_title = props.get_optional_string("legend.title");
        let present = props.get_bool("present");

        Self {
            color_scale,
            palette,
            annotation_mode,
            significance_threshold,
            annotate_diagonal,
            marker_scale_factor,
            figure_size: (width, height),
            text_precision,
            contrast_threshold,
            glyph,
            x_tick_rotation,
            y_tick_rotation,
            legend_title,
            present,
        }
    }

    /// Parse a JSON object of property values
    ///
    /// Values may be strings, numbers or booleans; null means "not set".
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            CorrPlotError::Config("settings must be a JSON object".to_string())
        })?;

        let mut user_values = HashMap::with_capacity(object.len());
        for (name, value) in object {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CorrPlotError::Config(format!(
                        "property '{}' must be a string, number or boolean, got {}",
                        name, other
                    )))
                }
            };
            user_values.insert(name.clone(), value);
        }

        Ok(Self::from_properties(&user_values))
    }

    /// Load a JSON settings file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

impl Default for CorrPlotConfig {
    fn default() -> Self {
        Self::from_properties(&HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CorrPlotConfig::default();
        assert_eq!(config.color_scale, ColorScaleKind::Diverging);
        assert_eq!(config.palette, None);
        assert_eq!(config.annotation_mode, AnnotationMode::Marker);
        assert_eq!(config.significance_threshold, 0.05);
        assert!(config.annotate_diagonal);
        assert_eq!(config.marker_scale_factor, 0.9);
        assert_eq!(config.figure_size, (800, 600));
        assert_eq!(config.text_precision, 4);
        assert_eq!(config.contrast_threshold, 0.7);
        assert_eq!(config.glyph, GlyphKind::Star);
        assert_eq!(config.x_tick_rotation, 90.0);
        assert_eq!(config.y_tick_rotation, 0.0);
        assert_eq!(config.legend_title, None);
        assert!(config.present);
    }

    #[test]
    fn test_from_json_str() {
        let config = CorrPlotConfig::from_json_str(
            r#"{
                "annotation.mode": "text",
                "significance.threshold": 0.01,
                "annotate.diagonal": false,
                "figure.width": 1000,
                "palette": "RdBu",
                "glyph": "cross",
                "legend.title": null
            }"#,
        )
        .unwrap();

        assert_eq!(config.annotation_mode, AnnotationMode::Text);
        assert_eq!(config.significance_threshold, 0.01);
        assert!(!config.annotate_diagonal);
        assert_eq!(config.figure_size, (1000, 600));
        assert_eq!(config.palette.as_deref(), Some("RdBu"));
        assert_eq!(config.glyph, GlyphKind::Cross);
        assert_eq!(config.legend_title, None);
    }

    #[test]
    fn test_from_json_str_rejects_non_object() {
        let err = CorrPlotConfig::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, CorrPlotError::Config(_)));

        let err = CorrPlotConfig::from_json_str(r#"{"palette": ["a"]}"#).unwrap_err();
        assert!(matches!(err, CorrPlotError::Config(_)));

        let err = CorrPlotConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, CorrPlotError::Json(_)));
    }

    #[test]
    fn test_out_of_range_threshold_uses_default() {
        let config = CorrPlotConfig::from_json_str(r#"{"significance.threshold": 0}"#).unwrap();
        assert_eq!(config.significance_threshold, 0.05);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(AnnotationMode::parse("TEXT"), AnnotationMode::Text);
        assert_eq!(AnnotationMode::parse("marker"), AnnotationMode::Marker);
        assert_eq!(GlyphKind::parse("dot"), GlyphKind::Dot);
        assert_eq!(GlyphKind::parse("star"), GlyphKind::Star);
    }
}
