//! Grid layout of matrix cells
//!
//! Cells sit on integer grid positions. Flattened cell `k = i * n + j`
//! (row `i`, column `j`) is placed at `x = j`, `y = n - 1 - i`, so the first
//! matrix row is drawn at the top like a printed matrix. Both axes span
//! `[-1, n]`, leaving one empty cell of padding around the grid.

/// Cell center in grid units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// N² cell centers in row-major order of the matrix
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGrid {
    side: usize,
    points: Vec<GridPoint>,
}

impl LayoutGrid {
    pub fn new(side: usize) -> Self {
        let mut points = Vec::with_capacity(side * side);
        for i in 0..side {
            for j in 0..side {
                points.push(GridPoint::new(j as f64, (side - 1 - i) as f64));
            }
        }
        Self { side, points }
    }

    /// Number of rows (= columns)
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<GridPoint> {
        self.points.get(index).copied()
    }

    /// (row, col) of a flattened index
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index / self.side, index % self.side)
    }

    /// Axis limits shared by x and y
    pub fn limits(&self) -> (f64, f64) {
        (-1.0, self.side as f64)
    }

    /// One tick per grid line: 0, 1, ..., n-1
    pub fn tick_positions(&self) -> Vec<f64> {
        (0..self.side).map(|p| p as f64).collect()
    }
}
