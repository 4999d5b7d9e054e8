//! corrplot-demo: render a random correlation matrix to PNG or SVG
//!
//! Usage:
//!   corrplot-demo --size 10 --seed 42 --output corr.png
//!   corrplot-demo --annotation text --threshold 0.01 --output corr.svg
//!   corrplot-demo --config settings.json
//!
//! Set RUST_LOG=debug for rendering details.

use anyhow::{Context, Result};
use clap::Parser;
use corrplot::{
    AnnotationMode, CorrPlotConfig, GridCorrelationRenderer, LabeledMatrix, PlottersSurface,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corrplot-demo")]
#[command(about = "Render a random correlation matrix with significance annotations")]
struct Cli {
    /// Number of variables (matrix side)
    #[arg(long, default_value = "8")]
    size: usize,

    /// Random seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output file; .svg writes SVG, anything else PNG
    #[arg(long, default_value = "corrplot.png")]
    output: PathBuf,

    /// Annotation of significant cells
    #[arg(long, value_parser = ["marker", "text"])]
    annotation: Option<String>,

    /// Significance threshold for p-values
    #[arg(long)]
    threshold: Option<f64>,

    /// JSON settings file (property name -> value)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Symmetric coefficients in [-1, 1) with a unit diagonal, uniform p-values
/// with a zero diagonal
fn sample_matrices(size: usize, rng: &mut impl Rng) -> Result<(LabeledMatrix, LabeledMatrix)> {
    let mut coefficients = vec![0.0; size * size];
    let mut pvalues = vec![0.0; size * size];

    for i in 0..size {
        coefficients[i * size + i] = 1.0;
        for j in (i + 1)..size {
            let r = rng.random_range(-1.0..1.0);
            let p = rng.random::<f64>();
            coefficients[i * size + j] = r;
            coefficients[j * size + i] = r;
            pvalues[i * size + j] = p;
            pvalues[j * size + i] = p;
        }
    }

    let labels: Vec<String> = (1..=size).map(|i| format!("var{}", i)).collect();
    Ok((
        LabeledMatrix::square(coefficients, labels.clone())?,
        LabeledMatrix::square(pvalues, labels)?,
    ))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CorrPlotConfig::from_json_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => CorrPlotConfig::default(),
    };
    if let Some(mode) = &cli.annotation {
        config.annotation_mode = AnnotationMode::parse(mode);
    }
    if let Some(threshold) = cli.threshold {
        config.significance_threshold = threshold;
    }
    config.present = true;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let (coefficients, pvalues) = sample_matrices(cli.size, &mut rng)?;

    let (width, height) = config.figure_size;
    let surface = PlottersSurface::to_file(&cli.output, width, height);
    let renderer = GridCorrelationRenderer::new(config);
    let handle = renderer.render(&coefficients, Some(&pvalues), Some(surface))?;

    let significant = handle
        .plot()
        .mask
        .as_ref()
        .map(|m| m.count())
        .unwrap_or(0);
    println!(
        "Wrote {} ({}x{} matrix, {} significant cells)",
        cli.output.display(),
        cli.size,
        cli.size,
        significant
    );

    Ok(())
}
