//! Grid correlation renderer
//!
//! Turns a square coefficient matrix (and optionally a p-value matrix of the
//! same shape) into drawing calls on a `Surface`:
//!
//! 1. validate shapes (nothing is drawn on failure)
//! 2. lay out N² cells on an integer grid, axes spanning `[-1, N]`
//! 3. one scatter marker per cell, radius ∝ |r|, colored by r
//! 4. annotate cells with p < threshold (glyph layer or p-value text)
//! 5. axis ticks labeled with the matrix labels, color legend
//! 6. optionally present the surface
//!
//! The surface is handed back inside a `FigureHandle` together with the
//! computed `CorrPlot`.

use crate::colors::ColorScale;
use crate::config::{AnnotationMode, CorrPlotConfig};
use crate::error::Result;
use crate::layout::LayoutGrid;
use crate::markers::{
    build_annotations, build_markers, cell_size_px, font_size_px, glyph_size_px, Annotation,
    AnnotationStyle, MarkerSpec, SignificanceMask, GLYPH_COLOR,
};
use crate::surface::{Axis, AxisTicks, GlyphLayer, NewSurface, Surface, TextAlign, TextLabel};
use crate::table::{CorrelationMatrix, SignificanceMatrix};
use log::{debug, info};
use uuid::Uuid;

/// Everything computed for one figure
#[derive(Debug, Clone, PartialEq)]
pub struct CorrPlot {
    pub grid: LayoutGrid,
    /// Pixel size of one grid unit
    pub cell_px: f64,
    pub markers: Vec<MarkerSpec>,
    /// Present when p-values were supplied
    pub mask: Option<SignificanceMask>,
    pub annotations: Vec<Annotation>,
    pub scale: ColorScale,
    pub x_ticks: AxisTicks,
    pub y_ticks: AxisTicks,
}

impl CorrPlot {
    /// Side length N of the matrix
    pub fn side(&self) -> usize {
        self.grid.side()
    }

    /// Axis limits shared by x and y
    pub fn limits(&self) -> (f64, f64) {
        self.grid.limits()
    }
}

/// A rendered figure: the surface it was drawn on plus the computed plot
#[derive(Debug)]
pub struct FigureHandle<S> {
    id: Uuid,
    surface: S,
    plot: CorrPlot,
}

impl<S: Surface> FigureHandle<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn plot(&self) -> &CorrPlot {
        &self.plot
    }

    /// Present the surface (for figures rendered with `present = false`)
    pub fn present(&mut self) -> Result<()> {
        self.surface.present()
    }
}

/// Renders correlation matrices as a grid of sized, colored markers
#[derive(Debug, Clone, Default)]
pub struct GridCorrelationRenderer {
    config: CorrPlotConfig,
}

impl GridCorrelationRenderer {
    pub fn new(config: CorrPlotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrPlotConfig {
        &self.config
    }

    /// Check the inputs, returning the side length N
    pub fn validate(
        &self,
        coefficients: &CorrelationMatrix,
        pvalues: Option<&SignificanceMatrix>,
    ) -> Result<usize> {
        let side = coefficients.ensure_square()?;
        if let Some(pvalues) = pvalues {
            coefficients.ensure_same_shape(pvalues)?;
        }
        Ok(side)
    }

    /// Compute layout, markers, mask, annotations, color scale and ticks
    ///
    /// `plot_area` is the pixel size of the region the grid is drawn in.
    pub fn prepare(
        &self,
        coefficients: &CorrelationMatrix,
        pvalues: Option<&SignificanceMatrix>,
        plot_area: (u32, u32),
    ) -> Result<CorrPlot> {
        let side = self.validate(coefficients, pvalues)?;
        let config = &self.config;

        let grid = LayoutGrid::new(side);
        let cell_px = cell_size_px(plot_area, side);
        let markers = build_markers(coefficients, &grid, cell_px, config.marker_scale_factor);

        let scale = ColorScale::for_values(
            config.color_scale,
            config.palette.as_deref(),
            coefficients.values(),
        );

        let (mask, annotations) = match pvalues {
            Some(pvalues) => {
                let mask = SignificanceMask::compute(
                    pvalues,
                    config.significance_threshold,
                    config.annotate_diagonal,
                );
                let style = AnnotationStyle {
                    mode: config.annotation_mode,
                    precision: config.text_precision,
                    contrast_threshold: config.contrast_threshold,
                };
                let annotations = build_annotations(&mask, coefficients, pvalues, &grid, style);
                (Some(mask), annotations)
            }
            None => (None, Vec::new()),
        };

        let ticks = grid.tick_positions();
        let x_ticks = AxisTicks {
            positions: ticks.clone(),
            labels: coefficients.row_labels().to_vec(),
            rotation: config.x_tick_rotation,
        };
        // Row 0 is drawn at the top, so the y labels run bottom-up
        let y_ticks = AxisTicks {
            positions: ticks,
            labels: coefficients.col_labels().iter().rev().cloned().collect(),
            rotation: config.y_tick_rotation,
        };

        debug!(
            "Prepared {}x{} grid: cell {:.1}px, {} annotations",
            side,
            side,
            cell_px,
            annotations.len()
        );

        Ok(CorrPlot {
            grid,
            cell_px,
            markers,
            mask,
            annotations,
            scale,
            x_ticks,
            y_ticks,
        })
    }

    /// Render on `target`, or on a new surface of `figure_size` when `None`
    pub fn render<S: NewSurface>(
        &self,
        coefficients: &CorrelationMatrix,
        pvalues: Option<&SignificanceMatrix>,
        target: Option<S>,
    ) -> Result<FigureHandle<S>> {
        // Fail before creating anything
        self.validate(coefficients, pvalues)?;

        let surface = match target {
            Some(surface) => surface,
            None => {
                let (width, height) = self.config.figure_size;
                debug!("Creating {}x{} surface", width, height);
                S::with_size(width, height)
            }
        };
        self.render_on(coefficients, pvalues, surface)
    }

    /// Render on the given surface
    pub fn render_on<S: Surface>(
        &self,
        coefficients: &CorrelationMatrix,
        pvalues: Option<&SignificanceMatrix>,
        mut surface: S,
    ) -> Result<FigureHandle<S>> {
        let side = self.validate(coefficients, pvalues)?;

        surface.set_aspect_equal()?;
        let limits = LayoutGrid::new(side).limits();
        surface.set_limits(limits, limits)?;

        let plot = self.prepare(coefficients, pvalues, surface.plot_area())?;
        self.draw(&plot, &mut surface)?;

        let id = Uuid::new_v4();
        info!(
            "Rendered correlation plot {} ({}x{}, {} significant cells)",
            id,
            side,
            side,
            plot.mask.as_ref().map(|m| m.count()).unwrap_or(0)
        );

        Ok(FigureHandle { id, surface, plot })
    }

    fn draw<S: Surface>(&self, plot: &CorrPlot, surface: &mut S) -> Result<()> {
        let config = &self.config;

        surface.draw_scatter(&plot.markers, &plot.scale)?;

        if plot.mask.is_some() {
            match config.annotation_mode {
                AnnotationMode::Marker => {
                    let layer = GlyphLayer {
                        positions: plot.annotations.iter().map(|a| a.position()).collect(),
                        glyph: config.glyph,
                        size: glyph_size_px(plot.cell_px, config.marker_scale_factor),
                        color: GLYPH_COLOR,
                    };
                    surface.draw_glyphs(&layer)?;
                }
                AnnotationMode::Text => {
                    let font_size = font_size_px(plot.cell_px);
                    for annotation in &plot.annotations {
                        if let Annotation::Text {
                            position,
                            text,
                            color,
                            ..
                        } = annotation
                        {
                            surface.draw_text(&TextLabel {
                                position: *position,
                                text: text.clone(),
                                font_size,
                                color: *color,
                                align: TextAlign::Center,
                            })?;
                        }
                    }
                }
            }
        }

        surface.set_axis_ticks(Axis::X, &plot.x_ticks)?;
        surface.set_axis_ticks(Axis::Y, &plot.y_ticks)?;
        surface.draw_color_legend(&plot.scale, config.legend_title.as_deref())?;

        if config.present {
            surface.present()?;
        }
        Ok(())
    }
}
