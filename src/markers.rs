//! Per-cell marker geometry, significance mask and annotations
//!
//! Every derived item carries the flattened cell index it came from so that
//! values, positions and annotations can never drift apart.

use crate::config::AnnotationMode;
use crate::layout::{GridPoint, LayoutGrid};
use crate::table::LabeledMatrix;

/// Glyph radius relative to the marker radius at |r| = 1
pub const GLYPH_RELATIVE_SIZE: f64 = 0.3;

/// Smallest font size used for p-value text, in pixels
pub const MIN_FONT_SIZE: f64 = 6.0;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

/// Glyphs are drawn in white on top of the marker
pub const GLYPH_COLOR: [u8; 3] = WHITE;

/// Scatter marker of one matrix cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpec {
    /// Flattened (row-major) cell index
    pub index: usize,
    pub position: GridPoint,
    /// Radius in pixels
    pub radius: f64,
    /// Coefficient, mapped through the color scale
    pub value: f64,
}

/// Pixel size of one grid unit
///
/// The axes span n + 1 units (`[-1, n]`), and the shorter side of the plot
/// area bounds the cell so markers stay round.
pub fn cell_size_px(plot_area: (u32, u32), side: usize) -> f64 {
    let (w, h) = plot_area;
    w.min(h) as f64 / (side + 1) as f64
}

/// Marker radius in pixels
///
/// Proportional to |r|: zero at r = 0, `scale_factor * cell_px / 2` at
/// |r| = 1. With `scale_factor <= 1` neighbouring markers never overlap.
/// Non-finite coefficients get no marker.
pub fn marker_radius(coefficient: f64, cell_px: f64, scale_factor: f64) -> f64 {
    if !coefficient.is_finite() {
        return 0.0;
    }
    (scale_factor * coefficient.abs() * cell_px / 2.0).max(0.0)
}

/// Build one marker per cell, in flattened order
pub fn build_markers(
    coefficients: &LabeledMatrix,
    grid: &LayoutGrid,
    cell_px: f64,
    scale_factor: f64,
) -> Vec<MarkerSpec> {
    coefficients
        .values()
        .iter()
        .zip(grid.points())
        .enumerate()
        .map(|(index, (&value, &position))| MarkerSpec {
            index,
            position,
            radius: marker_radius(value, cell_px, scale_factor),
            value,
        })
        .collect()
}

/// A p-value is significant when it is a number strictly below the threshold
pub fn is_significant(p_value: f64, threshold: f64) -> bool {
    !p_value.is_nan() && p_value < threshold
}

/// Cells whose p-value passes the significance test
#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceMask {
    cells: Vec<bool>,
}

impl SignificanceMask {
    /// Evaluate every cell of a square p-value matrix
    ///
    /// With `include_diagonal = false` diagonal cells are never significant.
    pub fn compute(pvalues: &LabeledMatrix, threshold: f64, include_diagonal: bool) -> Self {
        let side = pvalues.n_cols();
        let cells = pvalues
            .values()
            .iter()
            .enumerate()
            .map(|(k, &p)| {
                let on_diagonal = side > 0 && k / side == k % side;
                (include_diagonal || !on_diagonal) && is_significant(p, threshold)
            })
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_significant(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    /// Number of significant cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Flattened indices of significant cells, ascending
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(k, &c)| if c { Some(k) } else { None })
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }
}

/// Annotation drawn on a significant cell
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Glyph {
        index: usize,
        position: GridPoint,
    },
    Text {
        index: usize,
        position: GridPoint,
        text: String,
        color: [u8; 3],
    },
}

impl Annotation {
    pub fn index(&self) -> usize {
        match self {
            Annotation::Glyph { index, .. } | Annotation::Text { index, .. } => *index,
        }
    }

    pub fn position(&self) -> GridPoint {
        match self {
            Annotation::Glyph { position, .. } | Annotation::Text { position, .. } => *position,
        }
    }
}

/// Format a p-value with fixed decimal precision
pub fn format_pvalue(p_value: f64, precision: usize) -> String {
    format!("{:.*}", precision, p_value)
}

/// Font color that stays legible on a marker of the given coefficient
///
/// Strong coefficients map to saturated, dark marker colors.
pub fn contrast_color(coefficient: f64, threshold: f64) -> [u8; 3] {
    if coefficient.abs() > threshold {
        WHITE
    } else {
        BLACK
    }
}

/// Options controlling annotation content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    pub mode: AnnotationMode,
    pub precision: usize,
    pub contrast_threshold: f64,
}

/// Build annotations for every masked cell, in flattened order
pub fn build_annotations(
    mask: &SignificanceMask,
    coefficients: &LabeledMatrix,
    pvalues: &LabeledMatrix,
    grid: &LayoutGrid,
    style: AnnotationStyle,
) -> Vec<Annotation> {
    mask.indices()
        .filter_map(|index| {
            let position = grid.point(index)?;
            let annotation = match style.mode {
                AnnotationMode::Marker => Annotation::Glyph { index, position },
                AnnotationMode::Text => {
                    let p = *pvalues.values().get(index)?;
                    let r = *coefficients.values().get(index)?;
                    Annotation::Text {
                        index,
                        position,
                        text: format_pvalue(p, style.precision),
                        color: contrast_color(r, style.contrast_threshold),
                    }
                }
            };
            Some(annotation)
        })
        .collect()
}

/// Glyph size in pixels for a given cell size
pub fn glyph_size_px(cell_px: f64, scale_factor: f64) -> f64 {
    GLYPH_RELATIVE_SIZE * marker_radius(1.0, cell_px, scale_factor)
}

/// Font size in pixels for p-value text
pub fn font_size_px(cell_px: f64) -> f64 {
    (cell_px / 4.0).max(MIN_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[Vec<f64>]) -> LabeledMatrix {
        LabeledMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_cell_size_uses_shorter_side() {
        assert_eq!(cell_size_px((900, 500), 4), 100.0);
        assert_eq!(cell_size_px((500, 900), 9), 50.0);
    }

    #[test]
    fn test_marker_radius_non_negative_and_zero_at_zero() {
        let mut r = -1.0;
        while r <= 1.0 {
            assert!(marker_radius(r, 50.0, 0.9) >= 0.0);
            r += 0.01;
        }
        assert_eq!(marker_radius(0.0, 50.0, 0.9), 0.0);
        assert_eq!(marker_radius(f64::NAN, 50.0, 0.9), 0.0);
    }

    #[test]
    fn test_marker_radius_strictly_increasing_in_magnitude() {
        let mut prev = 0.0;
        for step in 1..=100 {
            let r = step as f64 / 100.0;
            let pos = marker_radius(r, 40.0, 0.9);
            let neg = marker_radius(-r, 40.0, 0.9);
            assert!(pos > prev);
            assert_eq!(pos, neg);
            prev = pos;
        }
    }

    #[test]
    fn test_markers_at_full_correlation_do_not_overlap() {
        let cell = cell_size_px((800, 600), 8);
        let radius = marker_radius(1.0, cell, 1.0);
        // Neighbouring centers are one cell apart
        assert!(2.0 * radius <= cell + 1e-9);
    }

    #[test]
    fn test_markers_shrink_as_n_grows() {
        let small = marker_radius(1.0, cell_size_px((600, 600), 4), 0.9);
        let large = marker_radius(1.0, cell_size_px((600, 600), 16), 0.9);
        assert!(large < small);
    }

    #[test]
    fn test_build_markers_keeps_cell_order() {
        let coefficients = matrix(&[vec![1.0, -0.5], vec![0.25, 0.0]]);
        let grid = LayoutGrid::new(2);
        let markers = build_markers(&coefficients, &grid, 20.0, 1.0);

        assert_eq!(markers.len(), 4);
        for (k, marker) in markers.iter().enumerate() {
            assert_eq!(marker.index, k);
            assert_eq!(marker.value, coefficients.values()[k]);
            assert_eq!(Some(marker.position), grid.point(k));
        }
        assert_eq!(markers[0].radius, 10.0);
        assert_eq!(markers[1].radius, 5.0);
        assert_eq!(markers[3].radius, 0.0);
    }

    #[test]
    fn test_is_significant() {
        assert!(is_significant(0.01, 0.05));
        assert!(!is_significant(0.05, 0.05));
        assert!(!is_significant(0.5, 0.05));
        assert!(!is_significant(f64::NAN, 0.05));
        assert!(!is_significant(f64::NAN, f64::INFINITY));
        assert!(is_significant(0.0, 0.05));
    }

    #[test]
    fn test_mask_excludes_nan_for_any_threshold() {
        let pvalues = matrix(&[vec![f64::NAN, 0.2], vec![f64::NAN, 0.9]]);
        for threshold in [0.0, 0.05, 0.5, 1.0, 10.0, f64::INFINITY] {
            let mask = SignificanceMask::compute(&pvalues, threshold, true);
            assert!(!mask.is_significant(0));
            assert!(!mask.is_significant(2));
        }
    }

    #[test]
    fn test_mask_iff_number_below_threshold() {
        let values = [0.0, 0.01, 0.049, 0.05, 0.051, 1.0, f64::NAN, 0.3, 0.04];
        let pvalues = matrix(&[values[0..3].to_vec(), values[3..6].to_vec(), values[6..9].to_vec()]);
        let mask = SignificanceMask::compute(&pvalues, 0.05, true);

        for (k, &p) in values.iter().enumerate() {
            assert_eq!(mask.is_significant(k), !p.is_nan() && p < 0.05, "cell {}", k);
        }
        assert_eq!(mask.count(), 4);
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![0, 1, 2, 8]);
    }

    #[test]
    fn test_identity_like_scenario_diagonal_included() {
        let pvalues = matrix(&[vec![0.0, 0.01], vec![0.01, 0.0]]);
        let mask = SignificanceMask::compute(&pvalues, 0.05, true);
        assert_eq!(mask.as_slice(), &[true, true, true, true]);
    }

    #[test]
    fn test_identity_like_scenario_diagonal_excluded() {
        let pvalues = matrix(&[vec![0.0, 0.01], vec![0.01, 0.0]]);
        let mask = SignificanceMask::compute(&pvalues, 0.05, false);
        assert_eq!(mask.as_slice(), &[false, true, true, false]);
    }

    #[test]
    fn test_format_pvalue() {
        assert_eq!(format_pvalue(0.012345, 4), "0.0123");
        assert_eq!(format_pvalue(0.5, 2), "0.50");
        assert_eq!(format_pvalue(0.04, 0), "0");
    }

    #[test]
    fn test_contrast_color() {
        assert_eq!(contrast_color(0.95, 0.7), WHITE);
        assert_eq!(contrast_color(-0.95, 0.7), WHITE);
        assert_eq!(contrast_color(0.3, 0.7), BLACK);
        assert_eq!(contrast_color(0.7, 0.7), BLACK);
    }

    #[test]
    fn test_build_annotations_text_mode() {
        let coefficients = matrix(&[vec![1.0, -0.9], vec![0.3, 1.0]]);
        let pvalues = matrix(&[vec![f64::NAN, 0.001], vec![0.02, f64::NAN]]);
        let grid = LayoutGrid::new(2);
        let mask = SignificanceMask::compute(&pvalues, 0.05, true);
        let style = AnnotationStyle {
            mode: AnnotationMode::Text,
            precision: 3,
            contrast_threshold: 0.7,
        };

        let annotations = build_annotations(&mask, &coefficients, &pvalues, &grid, style);
        assert_eq!(
            annotations,
            vec![
                Annotation::Text {
                    index: 1,
                    position: GridPoint::new(1.0, 1.0),
                    text: "0.001".to_string(),
                    color: WHITE,
                },
                Annotation::Text {
                    index: 2,
                    position: GridPoint::new(0.0, 0.0),
                    text: "0.020".to_string(),
                    color: BLACK,
                },
            ]
        );
    }

    #[test]
    fn test_build_annotations_marker_mode() {
        let coefficients = matrix(&[vec![1.0, 0.5], vec![0.5, 1.0]]);
        let pvalues = matrix(&[vec![0.9, 0.01], vec![0.9, 0.9]]);
        let grid = LayoutGrid::new(2);
        let mask = SignificanceMask::compute(&pvalues, 0.05, true);
        let style = AnnotationStyle {
            mode: AnnotationMode::Marker,
            precision: 4,
            contrast_threshold: 0.7,
        };

        let annotations = build_annotations(&mask, &coefficients, &pvalues, &grid, style);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].index(), 1);
        assert_eq!(annotations[0].position(), GridPoint::new(1.0, 1.0));
        assert!(matches!(annotations[0], Annotation::Glyph { .. }));
    }

    #[test]
    fn test_glyph_and_font_sizes() {
        assert!((glyph_size_px(100.0, 1.0) - 15.0).abs() < 1e-9);
        assert_eq!(font_size_px(100.0), 25.0);
        assert_eq!(font_size_px(8.0), MIN_FONT_SIZE);
    }
}
