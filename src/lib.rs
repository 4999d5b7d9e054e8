//! Correlation matrix plots
//!
//! Draws an N×N correlation matrix as a grid of circular markers: marker
//! size follows |r|, marker color follows r through a diverging (or
//! sequential) color scale. When a p-value matrix is supplied, cells with
//! p below a threshold are annotated with a glyph or with the p-value text.
//!
//! ```no_run
//! use corrplot::{CorrPlotConfig, GridCorrelationRenderer, LabeledMatrix, PlottersSurface};
//!
//! # fn main() -> corrplot::Result<()> {
//! let labels = vec!["a".to_string(), "b".to_string()];
//! let r = LabeledMatrix::square(vec![1.0, 0.3, 0.3, 1.0], labels.clone())?;
//! let p = LabeledMatrix::square(vec![0.0, 0.01, 0.01, 0.0], labels)?;
//!
//! let renderer = GridCorrelationRenderer::new(CorrPlotConfig::default());
//! let surface = PlottersSurface::to_file("corr.png", 800, 600);
//! renderer.render(&r, Some(&p), Some(surface))?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod colors;
pub mod config;
pub mod error;
pub mod layout;
pub mod markers;
pub mod palettes;
pub mod properties;
pub mod renderer;
pub mod surface;
pub mod table;

pub use backend::{OutputTarget, PlottersSurface};
pub use colors::{ColorScale, ColorScaleKind};
pub use config::{AnnotationMode, CorrPlotConfig, GlyphKind};
pub use error::{CorrPlotError, Result};
pub use renderer::{CorrPlot, FigureHandle, GridCorrelationRenderer};
pub use surface::{NewSurface, RecordingSurface, Surface};
pub use table::{CorrelationMatrix, LabeledMatrix, SignificanceMatrix};
