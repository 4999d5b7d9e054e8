use thiserror::Error;

/// Errors that can occur while building or rendering a correlation plot
#[derive(Debug, Error)]
pub enum CorrPlotError {
    /// Structural input mismatch (non-square matrix, mismatched shapes, label counts)
    #[error("Shape error: {0}")]
    Shape(String),

    /// Failure reported by the rendering backend
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid configuration document
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Type alias for Results using CorrPlotError
pub type Result<T> = std::result::Result<T, CorrPlotError>;
