//! Plotters rendering backend
//!
//! `PlottersSurface` records drawing calls into a `Scene` and rasterizes the
//! whole scene on `present()`, either to a PNG/SVG file or to an in-memory
//! SVG string.
//!
//! Layout of the figure (pixels):
//! ```text
//! +--------------------------------------------------+
//! | margin                                           |
//! |  y tick   +-------------------+  legend  | title |
//! |  labels   |    plot area      |  bar     | ticks |
//! |           +-------------------+                  |
//! |            x tick labels                         |
//! +--------------------------------------------------+
//! ```

use crate::colors::ColorScale;
use crate::config::GlyphKind;
use crate::error::{CorrPlotError, Result};
use crate::layout::GridPoint;
use crate::markers::MarkerSpec;
use crate::surface::{
    Axis, AxisTicks, DrawCommand, GlyphLayer, NewSurface, Scene, Surface, TextAlign, TextLabel,
};
use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::path::{Path, PathBuf};

/// Outer margin around everything
const MARGIN: i32 = 10;
/// Room for tick labels left of and below the plot area
const TICK_LABEL_SPACE: i32 = 70;
/// Room for the color legend right of the plot area
const LEGEND_WIDTH: i32 = 80;
const LEGEND_BAR_WIDTH: i32 = 16;
const LEGEND_TITLE_SPACE: i32 = 20;
const LEGEND_TICKS: usize = 5;
const TICK_LENGTH: i32 = 5;
const TICK_FONT_SIZE: f64 = 12.0;
const FONT_FAMILY: &str = "sans-serif";

fn render_error<E: std::fmt::Display>(e: E) -> CorrPlotError {
    CorrPlotError::Render(e.to_string())
}

fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Pixel placement of the plot area and the legend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    /// Top-left corner of the plot area
    pub plot_origin: (i32, i32),
    pub plot_size: (u32, u32),
    /// Top-left corner of the legend
    pub legend_origin: (i32, i32),
    pub legend_size: (u32, u32),
}

impl FrameLayout {
    /// Place the plot area inside a surface of `size` pixels
    ///
    /// With `aspect_equal` the plot area is square and centered in the space
    /// left after margins, tick labels and legend.
    pub fn compute(size: (u32, u32), aspect_equal: bool) -> Self {
        let (w, h) = (size.0 as i32, size.1 as i32);
        let avail_w = (w - TICK_LABEL_SPACE - LEGEND_WIDTH - 2 * MARGIN).max(1);
        let avail_h = (h - TICK_LABEL_SPACE - 2 * MARGIN).max(1);

        let (pw, ph) = if aspect_equal {
            let side = avail_w.min(avail_h);
            (side, side)
        } else {
            (avail_w, avail_h)
        };

        let x0 = MARGIN + TICK_LABEL_SPACE + (avail_w - pw) / 2;
        let y0 = MARGIN + (avail_h - ph) / 2;

        Self {
            plot_origin: (x0, y0),
            plot_size: (pw as u32, ph as u32),
            legend_origin: (x0 + pw + MARGIN, y0),
            legend_size: ((LEGEND_WIDTH - MARGIN) as u32, ph as u32),
        }
    }

    /// Bottom-right corner of the plot area
    pub fn plot_end(&self) -> (i32, i32) {
        (
            self.plot_origin.0 + self.plot_size.0 as i32,
            self.plot_origin.1 + self.plot_size.1 as i32,
        )
    }

    /// Map a grid position to pixels (y grows upwards in grid units)
    pub fn to_pixel(&self, point: GridPoint, x_lim: (f64, f64), y_lim: (f64, f64)) -> (i32, i32) {
        let fraction = |v: f64, (lo, hi): (f64, f64)| {
            if hi > lo {
                (v - lo) / (hi - lo)
            } else {
                0.5
            }
        };
        let tx = fraction(point.x, x_lim);
        let ty = fraction(point.y, y_lim);

        (
            self.plot_origin.0 + (tx * self.plot_size.0 as f64).round() as i32,
            self.plot_origin.1 + ((1.0 - ty) * self.plot_size.1 as f64).round() as i32,
        )
    }
}

/// Counter-clockwise quarter turns (0..=3) closest to a rotation in degrees
pub fn quarter_turns(degrees: f64) -> u8 {
    ((degrees.rem_euclid(360.0) / 90.0).round() as i64).rem_euclid(4) as u8
}

/// Font rotation for a number of counter-clockwise quarter turns
///
/// Plotters rotates clockwise, so one turn (90 degrees, reading bottom to
/// top) is `Rotate270`.
fn font_transform(turns: u8) -> FontTransform {
    match turns {
        1 => FontTransform::Rotate270,
        2 => FontTransform::Rotate180,
        3 => FontTransform::Rotate90,
        _ => FontTransform::None,
    }
}

/// Vertices of a five-pointed star centered at `center`
pub fn star_points(center: (i32, i32), radius: f64) -> Vec<(i32, i32)> {
    (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { radius } else { radius * 0.4 };
            let angle = -std::f64::consts::FRAC_PI_2 + k as f64 * std::f64::consts::PI / 5.0;
            (
                center.0 + (r * angle.cos()).round() as i32,
                center.1 + (r * angle.sin()).round() as i32,
            )
        })
        .collect()
}

fn text_style(size: f64, color: [u8; 3], rotation: FontTransform, pos: Pos) -> TextStyle<'static> {
    (FONT_FAMILY, size)
        .into_font()
        .transform(rotation)
        .color(&rgb(color))
        .pos(pos)
}

/// Replays a scene on any plotters drawing area
struct SceneRenderer<'a, DB: DrawingBackend> {
    root: &'a DrawingArea<DB, Shift>,
    frame: FrameLayout,
    x_lim: (f64, f64),
    y_lim: (f64, f64),
}

impl<'a, DB: DrawingBackend> SceneRenderer<'a, DB> {
    fn new(root: &'a DrawingArea<DB, Shift>, scene: &Scene) -> Self {
        let (x_lim, y_lim) = scene.limits().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
        Self {
            root,
            frame: FrameLayout::compute(scene.size, scene.aspect_equal()),
            x_lim,
            y_lim,
        }
    }

    fn pixel(&self, point: GridPoint) -> (i32, i32) {
        self.frame.to_pixel(point, self.x_lim, self.y_lim)
    }

    fn render(&self, scene: &Scene) -> Result<()> {
        self.root.fill(&WHITE).map_err(render_error)?;
        self.root
            .draw(&Rectangle::new(
                [self.frame.plot_origin, self.frame.plot_end()],
                BLACK.stroke_width(1),
            ))
            .map_err(render_error)?;

        for command in &scene.commands {
            match command {
                DrawCommand::SetAspectEqual | DrawCommand::SetLimits { .. } => {}
                DrawCommand::Scatter { markers, scale } => self.scatter(markers, scale)?,
                DrawCommand::Glyphs(layer) => self.glyphs(layer)?,
                DrawCommand::Text(label) => self.text(label)?,
                DrawCommand::AxisTicks { axis, ticks } => self.ticks(*axis, ticks)?,
                DrawCommand::ColorLegend { scale, title } => {
                    self.legend(scale, title.as_deref())?
                }
                DrawCommand::Present => {}
            }
        }
        Ok(())
    }

    fn scatter(&self, markers: &[MarkerSpec], scale: &ColorScale) -> Result<()> {
        for marker in markers.iter().filter(|m| m.radius >= 0.5) {
            let color = rgb(scale.color(marker.value));
            self.root
                .draw(&Circle::new(
                    self.pixel(marker.position),
                    marker.radius,
                    color.filled(),
                ))
                .map_err(render_error)?;
        }
        Ok(())
    }

    fn glyphs(&self, layer: &GlyphLayer) -> Result<()> {
        let color = rgb(layer.color);
        let s = layer.size.round() as i32;

        for &position in &layer.positions {
            let (x, y) = self.pixel(position);
            match layer.glyph {
                GlyphKind::Star => self
                    .root
                    .draw(&Polygon::new(star_points((x, y), layer.size), color.filled())),
                GlyphKind::Dot => self
                    .root
                    .draw(&Circle::new((x, y), layer.size, color.filled())),
                GlyphKind::Cross => self
                    .root
                    .draw(&PathElement::new(
                        vec![(x - s, y - s), (x + s, y + s)],
                        color.stroke_width(2),
                    ))
                    .and_then(|_| {
                        self.root.draw(&PathElement::new(
                            vec![(x - s, y + s), (x + s, y - s)],
                            color.stroke_width(2),
                        ))
                    }),
            }
            .map_err(render_error)?;
        }
        Ok(())
    }

    fn text(&self, label: &TextLabel) -> Result<()> {
        let hpos = match label.align {
            TextAlign::Left => HPos::Left,
            TextAlign::Center => HPos::Center,
            TextAlign::Right => HPos::Right,
        };
        let style = text_style(
            label.font_size,
            label.color,
            FontTransform::None,
            Pos::new(hpos, VPos::Center),
        );
        self.root
            .draw(&Text::new(label.text.clone(), self.pixel(label.position), style))
            .map_err(render_error)
    }

    fn ticks(&self, axis: Axis, ticks: &AxisTicks) -> Result<()> {
        let turns = quarter_turns(ticks.rotation);
        let (left, _) = self.frame.plot_origin;
        let (_, bottom) = self.frame.plot_end();

        for (&position, label) in ticks.positions.iter().zip(&ticks.labels) {
            let (tick, anchor, pos) = match axis {
                Axis::X => {
                    let (x, _) = self.pixel(GridPoint::new(position, self.y_lim.0));
                    let pos = match turns {
                        1 => Pos::new(HPos::Right, VPos::Center),
                        3 => Pos::new(HPos::Left, VPos::Center),
                        _ => Pos::new(HPos::Center, VPos::Top),
                    };
                    (
                        [(x, bottom), (x, bottom + TICK_LENGTH)],
                        (x, bottom + TICK_LENGTH + 3),
                        pos,
                    )
                }
                Axis::Y => {
                    let (_, y) = self.pixel(GridPoint::new(self.x_lim.0, position));
                    let pos = match turns {
                        0 | 2 => Pos::new(HPos::Right, VPos::Center),
                        _ => Pos::new(HPos::Center, VPos::Bottom),
                    };
                    (
                        [(left, y), (left - TICK_LENGTH, y)],
                        (left - TICK_LENGTH - 3, y),
                        pos,
                    )
                }
            };

            self.root
                .draw(&PathElement::new(tick.to_vec(), BLACK.stroke_width(1)))
                .map_err(render_error)?;
            let style = text_style(TICK_FONT_SIZE, [0, 0, 0], font_transform(turns), pos);
            self.root
                .draw(&Text::new(label.clone(), anchor, style))
                .map_err(render_error)?;
        }

        debug!("Drew {} {:?}-axis ticks", ticks.positions.len(), axis);
        Ok(())
    }

    fn legend(&self, scale: &ColorScale, title: Option<&str>) -> Result<()> {
        let (lx, ly) = self.frame.legend_origin;
        let title_space = if title.is_some() { LEGEND_TITLE_SPACE } else { 0 };
        let bar_top = ly + title_space;
        let bar_h = (self.frame.legend_size.1 as i32 - title_space).max(2);

        let (min, max) = scale.domain();
        let span = if max > min { max - min } else { 1.0 };

        // Gradient, top = max
        for py in 0..bar_h {
            let t = py as f64 / (bar_h - 1) as f64;
            let color = rgb(scale.color(max - span * t));
            self.root
                .draw(&Rectangle::new(
                    [(lx, bar_top + py), (lx + LEGEND_BAR_WIDTH, bar_top + py + 1)],
                    color.filled(),
                ))
                .map_err(render_error)?;
        }
        self.root
            .draw(&Rectangle::new(
                [(lx, bar_top), (lx + LEGEND_BAR_WIDTH, bar_top + bar_h)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_error)?;

        for k in 0..LEGEND_TICKS {
            let value = min + span * k as f64 / (LEGEND_TICKS - 1) as f64;
            let py = bar_top + (((max - value) / span) * (bar_h - 1) as f64).round() as i32;
            let style = text_style(
                TICK_FONT_SIZE,
                [0, 0, 0],
                FontTransform::None,
                Pos::new(HPos::Left, VPos::Center),
            );
            self.root
                .draw(&Text::new(
                    format!("{:.2}", value),
                    (lx + LEGEND_BAR_WIDTH + 4, py),
                    style,
                ))
                .map_err(render_error)?;
        }

        if let Some(title) = title {
            let style = text_style(
                TICK_FONT_SIZE,
                [0, 0, 0],
                FontTransform::None,
                Pos::new(HPos::Left, VPos::Top),
            );
            self.root
                .draw(&Text::new(title.to_string(), (lx, ly), style))
                .map_err(render_error)?;
        }
        Ok(())
    }
}

/// Where a `PlottersSurface` writes its output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    Png(PathBuf),
    Svg(PathBuf),
    /// Keep the SVG document in memory (see `PlottersSurface::svg`)
    SvgString,
}

impl OutputTarget {
    /// SVG for `.svg` paths, PNG otherwise
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let is_svg = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        if is_svg {
            OutputTarget::Svg(path.to_path_buf())
        } else {
            OutputTarget::Png(path.to_path_buf())
        }
    }
}

/// Surface rendered with plotters
#[derive(Debug, Clone)]
pub struct PlottersSurface {
    scene: Scene,
    target: OutputTarget,
    svg: Option<String>,
}

impl PlottersSurface {
    pub fn new(width: u32, height: u32, target: OutputTarget) -> Self {
        Self {
            scene: Scene::new(width, height),
            target,
            svg: None,
        }
    }

    /// Surface writing to a file, format chosen from the extension
    pub fn to_file(path: impl AsRef<Path>, width: u32, height: u32) -> Self {
        Self::new(width, height, OutputTarget::from_path(path))
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Rendered SVG document (SvgString target, after `present()`)
    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    pub fn frame(&self) -> FrameLayout {
        FrameLayout::compute(self.scene.size, self.scene.aspect_equal())
    }

    fn rasterize(&mut self) -> Result<()> {
        let size = self.scene.size;

        match &self.target {
            OutputTarget::Png(path) => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                SceneRenderer::new(&root, &self.scene).render(&self.scene)?;
                root.present().map_err(render_error)?;
                info!("Wrote PNG {} ({}x{})", path.display(), size.0, size.1);
            }
            OutputTarget::Svg(path) => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                SceneRenderer::new(&root, &self.scene).render(&self.scene)?;
                root.present().map_err(render_error)?;
                info!("Wrote SVG {} ({}x{})", path.display(), size.0, size.1);
            }
            OutputTarget::SvgString => {
                let mut buffer = String::new();
                {
                    let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
                    SceneRenderer::new(&root, &self.scene).render(&self.scene)?;
                    root.present().map_err(render_error)?;
                }
                debug!("Rendered SVG document ({} bytes)", buffer.len());
                self.svg = Some(buffer);
            }
        }
        Ok(())
    }
}

impl Surface for PlottersSurface {
    fn size(&self) -> (u32, u32) {
        self.scene.size
    }

    fn plot_area(&self) -> (u32, u32) {
        self.frame().plot_size
    }

    fn set_aspect_equal(&mut self) -> Result<()> {
        self.scene.push(DrawCommand::SetAspectEqual);
        Ok(())
    }

    fn set_limits(&mut self, x: (f64, f64), y: (f64, f64)) -> Result<()> {
        self.scene.push(DrawCommand::SetLimits { x, y });
        Ok(())
    }

    fn draw_scatter(&mut self, markers: &[MarkerSpec], scale: &ColorScale) -> Result<()> {
        self.scene.push(DrawCommand::Scatter {
            markers: markers.to_vec(),
            scale: scale.clone(),
        });
        Ok(())
    }

    fn draw_glyphs(&mut self, layer: &GlyphLayer) -> Result<()> {
        self.scene.push(DrawCommand::Glyphs(layer.clone()));
        Ok(())
    }

    fn draw_text(&mut self, label: &TextLabel) -> Result<()> {
        self.scene.push(DrawCommand::Text(label.clone()));
        Ok(())
    }

    fn set_axis_ticks(&mut self, axis: Axis, ticks: &AxisTicks) -> Result<()> {
        self.scene.push(DrawCommand::AxisTicks {
            axis,
            ticks: ticks.clone(),
        });
        Ok(())
    }

    fn draw_color_legend(&mut self, scale: &ColorScale, title: Option<&str>) -> Result<()> {
        self.scene.push(DrawCommand::ColorLegend {
            scale: scale.clone(),
            title: title.map(|t| t.to_string()),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.scene.push(DrawCommand::Present);
        self.rasterize()
    }
}

impl NewSurface for PlottersSurface {
    fn with_size(width: u32, height: u32) -> Self {
        Self::new(width, height, OutputTarget::SvgString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorScaleKind;

    #[test]
    fn test_frame_layout_square_and_inside() {
        let frame = FrameLayout::compute((800, 600), true);
        assert_eq!(frame.plot_size.0, frame.plot_size.1);

        let (x1, y1) = frame.plot_end();
        assert!(frame.plot_origin.0 >= MARGIN + TICK_LABEL_SPACE);
        assert!(frame.plot_origin.1 >= MARGIN);
        assert!(y1 <= 600 - MARGIN - TICK_LABEL_SPACE);
        assert!(x1 + LEGEND_WIDTH <= 800 - MARGIN);
        assert!(frame.legend_origin.0 + frame.legend_size.0 as i32 <= 800 - MARGIN);
    }

    #[test]
    fn test_frame_layout_free_aspect_fills_space() {
        let frame = FrameLayout::compute((800, 600), false);
        assert_eq!(
            frame.plot_size,
            (
                (800 - TICK_LABEL_SPACE - LEGEND_WIDTH - 2 * MARGIN) as u32,
                (600 - TICK_LABEL_SPACE - 2 * MARGIN) as u32
            )
        );
    }

    #[test]
    fn test_frame_layout_tiny_surface() {
        let frame = FrameLayout::compute((10, 10), true);
        assert_eq!(frame.plot_size, (1, 1));
    }

    #[test]
    fn test_to_pixel_corners() {
        let frame = FrameLayout::compute((500, 500), true);
        let lim = (-1.0, 4.0);
        let (x0, y0) = frame.plot_origin;
        let (x1, y1) = frame.plot_end();

        assert_eq!(frame.to_pixel(GridPoint::new(-1.0, 4.0), lim, lim), (x0, y0));
        assert_eq!(frame.to_pixel(GridPoint::new(4.0, -1.0), lim, lim), (x1, y1));

        // Higher grid y is closer to the top
        let top = frame.to_pixel(GridPoint::new(0.0, 3.0), lim, lim);
        let bottom = frame.to_pixel(GridPoint::new(0.0, 0.0), lim, lim);
        assert!(top.1 < bottom.1);
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(quarter_turns(0.0), 0);
        assert_eq!(quarter_turns(90.0), 1);
        assert_eq!(quarter_turns(-90.0), 3);
        assert_eq!(quarter_turns(180.0), 2);
        assert_eq!(quarter_turns(359.0), 0);
        assert_eq!(quarter_turns(100.0), 1);
    }

    #[test]
    fn test_star_points() {
        let points = star_points((50, 50), 10.0);
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], (50, 40)); // top tip
    }

    #[test]
    fn test_output_target_from_path() {
        assert_eq!(
            OutputTarget::from_path("plot.SVG"),
            OutputTarget::Svg(PathBuf::from("plot.SVG"))
        );
        assert_eq!(
            OutputTarget::from_path("plot.png"),
            OutputTarget::Png(PathBuf::from("plot.png"))
        );
        assert_eq!(
            OutputTarget::from_path("plot"),
            OutputTarget::Png(PathBuf::from("plot"))
        );
    }

    #[test]
    fn test_plot_area_follows_aspect() {
        let mut surface = PlottersSurface::with_size(800, 600);
        let free = surface.plot_area();
        surface.set_aspect_equal().unwrap();
        let square = surface.plot_area();

        assert_eq!(square.0, square.1);
        assert!(square.0 <= free.0);
        assert!(square.1 <= free.1);
    }

    #[test]
    fn test_present_renders_svg_string() {
        // No text commands: the scene renders without font lookups
        let mut surface = PlottersSurface::with_size(400, 300);
        surface.set_aspect_equal().unwrap();
        surface.set_limits((-1.0, 2.0), (-1.0, 2.0)).unwrap();

        let scale = ColorScale::for_values(ColorScaleKind::Diverging, None, &[1.0, -0.5]);
        let markers = vec![
            MarkerSpec {
                index: 0,
                position: GridPoint::new(0.0, 1.0),
                radius: 20.0,
                value: 1.0,
            },
            MarkerSpec {
                index: 1,
                position: GridPoint::new(1.0, 1.0),
                radius: 10.0,
                value: -0.5,
            },
        ];
        surface.draw_scatter(&markers, &scale).unwrap();
        surface
            .draw_glyphs(&GlyphLayer {
                positions: vec![GridPoint::new(1.0, 1.0)],
                glyph: GlyphKind::Star,
                size: 5.0,
                color: [255, 255, 255],
            })
            .unwrap();

        assert!(surface.svg().is_none());
        surface.present().unwrap();

        let svg = surface.svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<polygon"));
    }
}
