use super::error::{GrowthError, GrowthResult};
use super::kernel::Kernel;
use rayon::prelude::*;

/// Largest supported number of axes.
pub const MAX_DIMS: usize = 3;

/// Dense 2D or 3D field of cell values on a torus.
///
/// Axes are ordered `[height, width]` or `[depth, height, width]` and cells
/// are stored row-major. The shape is fixed once the grid exists; evolution
/// produces new grids instead of editing cells in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    shape: Vec<usize>,
    cells: Vec<f64>,
}

impl Grid {
    /// Create a grid with every cell at zero
    pub fn new(shape: &[usize]) -> GrowthResult<Self> {
        validate_shape(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            cells: vec![0.0; shape.iter().product()],
        })
    }

    /// Wrap existing row-major cell values
    pub fn from_cells(shape: &[usize], cells: Vec<f64>) -> GrowthResult<Self> {
        validate_shape(shape)?;
        let volume: usize = shape.iter().product();
        if cells.len() != volume {
            return Err(GrowthError::InvalidShape(format!(
                "{} cells do not fill shape {:?}",
                cells.len(),
                shape
            )));
        }
        Ok(Self { shape: shape.to_vec(), cells })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dimensionality(&self) -> usize {
        self.shape.len()
    }

    /// Total number of cells
    pub fn volume(&self) -> usize {
        self.cells.len()
    }

    /// Read-only view of all cells in row-major order
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Convert coordinates to a flat index, `None` when out of bounds
    pub fn index_of(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.shape.len() {
            return None;
        }
        coords
            .iter()
            .zip(&self.shape)
            .try_fold(0, |idx, (&c, &extent)| (c < extent).then(|| idx * extent + c))
    }

    /// Convert a flat index back to per-axis coordinates
    pub(crate) fn coords_of(&self, mut index: usize) -> [usize; MAX_DIMS] {
        let mut coords = [0; MAX_DIMS];
        for axis in (0..self.shape.len()).rev() {
            coords[axis] = index % self.shape[axis];
            index /= self.shape[axis];
        }
        coords
    }

    /// Get cell value at coordinates (with bounds checking)
    pub fn get(&self, coords: &[usize]) -> Option<f64> {
        self.index_of(coords).map(|idx| self.cells[idx])
    }

    /// Set cell value at coordinates; out-of-bounds writes are ignored
    pub fn set(&mut self, coords: &[usize], value: f64) {
        if let Some(idx) = self.index_of(coords) {
            self.cells[idx] = value;
        }
    }

    /// Flat index of `coords + offset` with toroidal wrapping on every axis
    fn wrapped_index(&self, coords: &[usize; MAX_DIMS], offset: &[isize; MAX_DIMS]) -> usize {
        self.shape.iter().enumerate().fold(0, |idx, (axis, &extent)| {
            let extent = extent as isize;
            let c = (coords[axis] as isize + offset[axis]).rem_euclid(extent);
            idx * extent as usize + c as usize
        })
    }

    /// Weighted neighborhood sum for one cell
    fn weighted_neighbors(&self, index: usize, kernel: &Kernel) -> f64 {
        let coords = self.coords_of(index);
        kernel
            .taps()
            .iter()
            .map(|tap| tap.weight * self.cells[self.wrapped_index(&coords, &tap.offset)])
            .sum()
    }

    /// Periodic convolution of the grid with `kernel` (serial)
    pub fn neighbor_field(&self, kernel: &Kernel) -> GrowthResult<Vec<f64>> {
        self.check_kernel(kernel)?;
        Ok((0..self.cells.len())
            .map(|idx| self.weighted_neighbors(idx, kernel))
            .collect())
    }

    /// Periodic convolution using rayon; identical output to the serial path
    pub fn neighbor_field_parallel(&self, kernel: &Kernel) -> GrowthResult<Vec<f64>> {
        self.check_kernel(kernel)?;
        Ok((0..self.cells.len())
            .into_par_iter()
            .map(|idx| self.weighted_neighbors(idx, kernel))
            .collect())
    }

    fn check_kernel(&self, kernel: &Kernel) -> GrowthResult<()> {
        if kernel.dimensionality() != self.dimensionality() {
            return Err(GrowthError::InvalidShape(format!(
                "{}D kernel cannot be applied to a {}D grid",
                kernel.dimensionality(),
                self.dimensionality()
            )));
        }
        Ok(())
    }

    /// Count cells strictly above `threshold`
    pub fn active_count(&self, threshold: f64) -> usize {
        self.cells.iter().filter(|&&v| v > threshold).count()
    }

    /// True when every cell is zero
    pub fn is_extinct(&self) -> bool {
        self.cells.iter().all(|&v| v == 0.0)
    }

    /// Iterate over all cells with their coordinates
    pub fn iter_cells(&self) -> impl Iterator<Item = (Vec<usize>, f64)> + '_ {
        self.cells.iter().enumerate().map(move |(idx, &value)| {
            let coords = self.coords_of(idx);
            (coords[..self.shape.len()].to_vec(), value)
        })
    }
}

/// Check that a shape has 2 or 3 non-empty axes
pub(crate) fn validate_shape(shape: &[usize]) -> GrowthResult<()> {
    if !(2..=MAX_DIMS).contains(&shape.len()) {
        return Err(GrowthError::InvalidShape(format!(
            "grids must have 2 or 3 axes, got {}",
            shape.len()
        )));
    }
    if shape.contains(&0) {
        return Err(GrowthError::InvalidParameter(format!(
            "grid extents must be non-zero, got {:?}",
            shape
        )));
    }
    Ok(())
}
