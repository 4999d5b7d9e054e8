//! Drawing surface abstraction
//!
//! The renderer never talks to a graphics library directly. It issues
//! drawing primitives (scatter markers, glyphs, text, axis ticks, a color
//! legend) against a `Surface`, which owns the pixels.
//!
//! `RecordingSurface` keeps every call as a `DrawCommand`; the plotters
//! backend records the same `Scene` and rasterizes it on `present()`.

use crate::colors::ColorScale;
use crate::config::GlyphKind;
use crate::error::Result;
use crate::layout::GridPoint;
use crate::markers::MarkerSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Tick positions with their labels
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTicks {
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
    /// Label rotation in degrees
    pub rotation: f64,
}

/// Horizontal text alignment (text is always vertically centered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Text placed at a grid position
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub position: GridPoint,
    pub text: String,
    /// Font size in pixels
    pub font_size: f64,
    pub color: [u8; 3],
    pub align: TextAlign,
}

/// Glyphs of one kind, size and color at several positions
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphLayer {
    pub positions: Vec<GridPoint>,
    pub glyph: GlyphKind,
    /// Glyph radius in pixels
    pub size: f64,
    pub color: [u8; 3],
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetAspectEqual,
    SetLimits {
        x: (f64, f64),
        y: (f64, f64),
    },
    Scatter {
        markers: Vec<MarkerSpec>,
        scale: ColorScale,
    },
    Glyphs(GlyphLayer),
    Text(TextLabel),
    AxisTicks {
        axis: Axis,
        ticks: AxisTicks,
    },
    ColorLegend {
        scale: ColorScale,
        title: Option<String>,
    },
    Present,
}

/// Ordered list of drawing commands for a surface of a given size
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: (u32, u32),
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Whether equal aspect ratio was requested
    pub fn aspect_equal(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::SetAspectEqual))
    }

    /// Last requested axis limits
    pub fn limits(&self) -> Option<((f64, f64), (f64, f64))> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::SetLimits { x, y } => Some((*x, *y)),
            _ => None,
        })
    }

    /// Last ticks requested for an axis
    pub fn ticks(&self, axis: Axis) -> Option<&AxisTicks> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::AxisTicks { axis: a, ticks } if *a == axis => Some(ticks),
            _ => None,
        })
    }

    /// Number of drawing commands (everything except configuration calls)
    pub fn drawing_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Scatter { .. }
                        | DrawCommand::Glyphs(_)
                        | DrawCommand::Text(_)
                        | DrawCommand::ColorLegend { .. }
                )
            })
            .count()
    }
}

/// 2-D drawing surface receiving plot primitives
///
/// Positions are in grid units; the surface maps them to pixels using the
/// limits set with `set_limits`. Sizes (marker radius, glyph size, font
/// size) are in pixels.
pub trait Surface {
    /// Total size in pixels (width, height)
    fn size(&self) -> (u32, u32);

    /// Pixel size of the area the grid is drawn in
    ///
    /// Surfaces reserving room for ticks and the legend override this.
    fn plot_area(&self) -> (u32, u32) {
        self.size()
    }

    fn set_aspect_equal(&mut self) -> Result<()>;

    fn set_limits(&mut self, x: (f64, f64), y: (f64, f64)) -> Result<()>;

    /// One filled marker per entry, colored through `scale`
    fn draw_scatter(&mut self, markers: &[MarkerSpec], scale: &ColorScale) -> Result<()>;

    fn draw_glyphs(&mut self, layer: &GlyphLayer) -> Result<()>;

    fn draw_text(&mut self, label: &TextLabel) -> Result<()>;

    fn set_axis_ticks(&mut self, axis: Axis, ticks: &AxisTicks) -> Result<()>;

    fn draw_color_legend(&mut self, scale: &ColorScale, title: Option<&str>) -> Result<()>;

    /// Display or flush the drawing
    fn present(&mut self) -> Result<()>;
}

/// Render onto a borrowed surface, keeping ownership with the caller
impl<S: Surface + ?Sized> Surface for &mut S {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn plot_area(&self) -> (u32, u32) {
        (**self).plot_area()
    }

    fn set_aspect_equal(&mut self) -> Result<()> {
        (**self).set_aspect_equal()
    }

    fn set_limits(&mut self, x: (f64, f64), y: (f64, f64)) -> Result<()> {
        (**self).set_limits(x, y)
    }

    fn draw_scatter(&mut self, markers: &[MarkerSpec], scale: &ColorScale) -> Result<()> {
        (**self).draw_scatter(markers, scale)
    }

    fn draw_glyphs(&mut self, layer: &GlyphLayer) -> Result<()> {
        (**self).draw_glyphs(layer)
    }

    fn draw_text(&mut self, label: &TextLabel) -> Result<()> {
        (**self).draw_text(label)
    }

    fn set_axis_ticks(&mut self, axis: Axis, ticks: &AxisTicks) -> Result<()> {
        (**self).set_axis_ticks(axis, ticks)
    }

    fn draw_color_legend(&mut self, scale: &ColorScale, title: Option<&str>) -> Result<()> {
        (**self).draw_color_legend(scale, title)
    }

    fn present(&mut self) -> Result<()> {
        (**self).present()
    }
}

/// Surfaces the renderer can create on its own
pub trait NewSurface: Surface + Sized {
    fn with_size(width: u32, height: u32) -> Self;
}

/// Surface that records every call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    scene: Scene,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scene: Scene::new(width, height),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.scene.commands
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.scene.size
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
        Ok(())
    }
}

impl NewSurface for RecordingSurface {
    fn with_size(width: u32, height: u32) -> Self {
        Self::new(width, height)
    }
}
