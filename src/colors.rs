//! Continuous color scales and RGB interpolation
//!
//! A `ColorScale` maps coefficient values to RGB through a `ColorPalette` of
//! sorted color stops. Diverging scales are symmetric around zero so that the
//! palette's middle color lands exactly on 0.

use crate::palettes::{palette_registry, PaletteDefinition, PaletteType};
use log::debug;

/// Neutral gray used for missing values and empty palettes
pub const MISSING_COLOR: [u8; 3] = [128, 128, 128];

/// A single color stop in a palette
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    /// Numeric value at this stop
    pub value: f64,
    /// RGB color at this stop
    pub color: [u8; 3],
}

/// A color palette with sorted color stops for interpolation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorPalette {
    /// Sorted list of color stops (by value, ascending)
    pub stops: Vec<ColorStop>,
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a color stop and maintain sorted order
    pub fn add_stop(&mut self, value: f64, color: [u8; 3]) {
        let stop = ColorStop { value, color };
        match self.stops.binary_search_by(|s| s.value.total_cmp(&value)) {
            Ok(pos) => self.stops[pos] = stop, // Replace if exists
            Err(pos) => self.stops.insert(pos, stop),
        }
    }

    /// Spread the colors of a palette definition evenly over [min, max]
    pub fn spread(def: &PaletteDefinition, min: f64, max: f64) -> Self {
        let colors = def.get_colors_rgb();
        let mut palette = Self::new();

        match colors.len() {
            0 => {}
            1 => palette.add_stop(min, colors[0]),
            n => {
                for (i, color) in colors.into_iter().enumerate() {
                    let t = i as f64 / (n - 1) as f64;
                    palette.add_stop(min + (max - min) * t, color);
                }
            }
        }

        palette
    }

    /// Get the value range of this palette
    pub fn range(&self) -> Option<(f64, f64)> {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => Some((first.value, last.value)),
            _ => None,
        }
    }
}

/// Interpolate a color value using the palette
///
/// Uses linear interpolation between the surrounding color stops.
/// Values outside the palette range clamp to the min/max colors.
pub fn interpolate_color(value: f64, palette: &ColorPalette) -> [u8; 3] {
    let (first, last) = match (palette.stops.first(), palette.stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return MISSING_COLOR,
    };

    if value.is_nan() {
        return MISSING_COLOR;
    }
    if value <= first.value {
        return first.color;
    }
    if value >= last.value {
        return last.color;
    }

    // Find surrounding stops using binary search
    let stops = &palette.stops;
    let idx = stops.partition_point(|stop| stop.value < value);
    let lower = &stops[idx - 1];
    let upper = &stops[idx];

    let t = (value - lower.value) / (upper.value - lower.value);
    [
        (lower.color[0] as f64 * (1.0 - t) + upper.color[0] as f64 * t) as u8,
        (lower.color[1] as f64 * (1.0 - t) + upper.color[1] as f64 * t) as u8,
        (lower.color[2] as f64 * (1.0 - t) + upper.color[2] as f64 * t) as u8,
    ]
}

/// Kind of color scale used for the markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScaleKind {
    /// Neutral color at zero, two hue directions for negative/positive values
    #[default]
    Diverging,
    /// Gradient from the minimum to the maximum value
    Sequential,
}

impl ColorScaleKind {
    /// Parse from string value
    ///
    /// Validation happens in PropertyReader.get_enum()
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sequential" => Self::Sequential,
            _ => Self::Diverging,
        }
    }

    fn palette_type(self) -> PaletteType {
        match self {
            Self::Diverging => PaletteType::Diverging,
            Self::Sequential => PaletteType::Sequential,
        }
    }
}

/// A color scale over a value domain
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub kind: ColorScaleKind,
    /// Name of the palette the stops were built from
    pub palette_name: String,
    pub palette: ColorPalette,
}

impl ColorScale {
    /// Diverging scale over [-limit, limit]
    pub fn diverging(def: &PaletteDefinition, limit: f64) -> Self {
        Self {
            kind: ColorScaleKind::Diverging,
            palette_name: def.name.clone(),
            palette: ColorPalette::spread(def, -limit, limit),
        }
    }

    /// Sequential scale over [min, max]
    pub fn sequential(def: &PaletteDefinition, min: f64, max: f64) -> Self {
        Self {
            kind: ColorScaleKind::Sequential,
            palette_name: def.name.clone(),
            palette: ColorPalette::spread(def, min, max),
        }
    }

    /// Build the scale for a set of coefficient values
    ///
    /// Diverging scales span [-1, 1], widened symmetrically when a value's
    /// magnitude exceeds 1. Sequential scales span the finite data range
    /// (or [-1, 1] when there are no finite values or the range is empty).
    pub fn for_values(kind: ColorScaleKind, palette_name: Option<&str>, values: &[f64]) -> Self {
        let registry = palette_registry();
        let fallback;
        let def = match registry.resolve(palette_name, kind.palette_type()) {
            Some(def) => def,
            None => {
                fallback = PaletteDefinition {
                    name: "Gray".to_string(),
                    palette_type: kind.palette_type(),
                    colors: vec!["#000000".to_string(), "#FFFFFF".to_string()],
                };
                &fallback
            }
        };

        let finite = values.iter().copied().filter(|v| v.is_finite());

        let scale = match kind {
            ColorScaleKind::Diverging => {
                let limit = finite.map(f64::abs).fold(1.0, f64::max);
                Self::diverging(def, limit)
            }
            ColorScaleKind::Sequential => {
                let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
                if min < max {
                    Self::sequential(def, min, max)
                } else {
                    Self::sequential(def, -1.0, 1.0)
                }
            }
        };

        debug!(
            "ColorScale: {:?} '{}' over {:?}",
            scale.kind,
            scale.palette_name,
            scale.domain()
        );

        scale
    }

    /// Map a value to RGB (NaN maps to gray)
    pub fn color(&self, value: f64) -> [u8; 3] {
        interpolate_color(value, &self.palette)
    }

    /// (min, max) of the scale
    pub fn domain(&self) -> (f64, f64) {
        self.palette.range().unwrap_or((-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_add_stop() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [255, 255, 255]);
        palette.add_stop(50.0, [128, 128, 128]);
        palette.add_stop(50.0, [1, 2, 3]);

        assert_eq!(palette.stops.len(), 3);
        assert_eq!(palette.stops[0].value, 0.0);
        assert_eq!(palette.stops[1].value, 50.0);
        assert_eq!(palette.stops[1].color, [1, 2, 3]);
        assert_eq!(palette.stops[2].value, 100.0);
    }

    #[test]
    fn test_interpolate_color_edge_cases() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [255, 255, 255]);

        assert_eq!(interpolate_color(-10.0, &palette), [0, 0, 0]);
        assert_eq!(interpolate_color(0.0, &palette), [0, 0, 0]);
        assert_eq!(interpolate_color(100.0, &palette), [255, 255, 255]);
        assert_eq!(interpolate_color(110.0, &palette), [255, 255, 255]);
        assert_eq!(interpolate_color(f64::NAN, &palette), MISSING_COLOR);
        assert_eq!(interpolate_color(1.0, &ColorPalette::new()), MISSING_COLOR);
    }

    #[test]
    fn test_interpolate_color_midpoint() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [100, 200, 255]);

        assert_eq!(interpolate_color(50.0, &palette), [50, 100, 127]);
    }

    #[test]
    fn test_palette_range() {
        let mut palette = ColorPalette::new();
        assert_eq!(palette.range(), None);

        palette.add_stop(10.0, [0, 0, 0]);
        palette.add_stop(50.0, [255, 255, 255]);
        assert_eq!(palette.range(), Some((10.0, 50.0)));
    }

    #[test]
    fn test_diverging_scale_centered_at_zero() {
        let scale = ColorScale::for_values(ColorScaleKind::Diverging, None, &[0.2, -0.5, 1.0]);
        assert_eq!(scale.domain(), (-1.0, 1.0));
        assert_eq!(scale.palette_name, "Seismic");

        // Seismic: dark blue, blue, white, red, dark red
        assert_eq!(scale.color(0.0), [255, 255, 255]);
        assert_eq!(scale.color(-0.5), [0, 0, 255]);
        assert_eq!(scale.color(0.5), [255, 0, 0]);
        assert_ne!(scale.color(-0.8), scale.color(0.8));
    }

    #[test]
    fn test_diverging_scale_widens_symmetrically() {
        let scale = ColorScale::for_values(ColorScaleKind::Diverging, None, &[2.5, -0.5, f64::NAN]);
        assert_eq!(scale.domain(), (-2.5, 2.5));
        assert_eq!(scale.color(0.0), [255, 255, 255]);
    }

    #[test]
    fn test_sequential_scale_spans_data() {
        let scale =
            ColorScale::for_values(ColorScaleKind::Sequential, Some("Greys"), &[0.25, 0.75, 0.5]);
        assert_eq!(scale.kind, ColorScaleKind::Sequential);
        assert_eq!(scale.domain(), (0.25, 0.75));
        assert_eq!(scale.color(0.25), [255, 255, 255]);
        assert_eq!(scale.color(0.75), [0, 0, 0]);
    }

    #[test]
    fn test_sequential_scale_constant_values() {
        let scale = ColorScale::for_values(ColorScaleKind::Sequential, None, &[0.3, 0.3]);
        assert_eq!(scale.domain(), (-1.0, 1.0));
    }

    #[test]
    fn test_scale_kind_parse() {
        assert_eq!(ColorScaleKind::parse("Sequential"), ColorScaleKind::Sequential);
        assert_eq!(ColorScaleKind::parse("diverging"), ColorScaleKind::Diverging);
        assert_eq!(ColorScaleKind::parse("other"), ColorScaleKind::Diverging);
    }
}
