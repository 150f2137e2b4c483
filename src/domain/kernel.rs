//! Neighborhood kernels for 2D and 3D growth.
//!
//! A kernel is a 3x3 (or 3x3x3) block of weights centered on the cell being
//! updated. The center weight is always zero and the weights sum to one, so a
//! neighbor field is the live fraction of the neighborhood.

use super::error::{GrowthError, GrowthResult};
use super::grid::MAX_DIMS;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Neighborhood topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelShape {
    /// Every cell in the block except the center (8 in 2D, 26 in 3D)
    Moore,
    /// Cells sharing a face with the center (4 in 2D, 6 in 3D)
    FaceAdjacent,
}

impl KernelShape {
    /// Resolve a kernel name for a given dimensionality.
    ///
    /// `sphere_approx`, `sphere` and `cube` only exist for 3D neighborhoods.
    pub fn parse(name: &str, dimensionality: usize) -> GrowthResult<Self> {
        match (name, dimensionality) {
            ("moore" | "full", 2 | 3) | ("cube", 3) => Ok(Self::Moore),
            ("von_neumann" | "diamond" | "face_adjacent", 2 | 3) | ("sphere_approx" | "sphere", 3) => {
                Ok(Self::FaceAdjacent)
            }
            _ => Err(GrowthError::InvalidShape(format!(
                "no {dimensionality}D kernel named {name:?}"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Moore => "moore",
            Self::FaceAdjacent => "face_adjacent",
        }
    }
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelShape {
    type Err = GrowthError;

    /// Parses names valid in both 2D and 3D
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, 2)
    }
}

/// One non-zero kernel entry as an offset from the center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    pub offset: [isize; MAX_DIMS],
    pub weight: f64,
}

/// Normalized neighborhood weights.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    shape: KernelShape,
    dimensionality: usize,
    /// Dense 3^d weights, row-major, center at the middle
    weights: Vec<f64>,
    /// Non-zero entries, used by convolution
    taps: Vec<Tap>,
}

impl Kernel {
    /// Build a kernel from its name and dimensionality
    pub fn build(name: &str, dimensionality: usize) -> GrowthResult<Self> {
        let shape = KernelShape::parse(name, dimensionality)?;
        Ok(Self::from_shape(shape, dimensionality))
    }

    fn from_shape(shape: KernelShape, dimensionality: usize) -> Self {
        let size = 3usize.pow(dimensionality as u32);
        let mut raw = vec![0.0; size];
        let mut offsets = Vec::with_capacity(size);

        for (i, slot) in raw.iter_mut().enumerate() {
            let offset = block_offset(i, dimensionality);
            let manhattan: usize = offset.iter().map(|o| o.unsigned_abs()).sum();
            let included = match shape {
                KernelShape::Moore => manhattan > 0,
                KernelShape::FaceAdjacent => manhattan == 1,
            };
            if included {
                *slot = 1.0;
            }
            offsets.push(offset);
        }

        let total: f64 = raw.iter().sum();
        let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
        let taps = weights
            .iter()
            .zip(offsets)
            .filter(|(w, _)| **w > 0.0)
            .map(|(&weight, offset)| Tap { offset, weight })
            .collect();

        Self { shape, dimensionality, weights, taps }
    }

    pub fn shape(&self) -> KernelShape {
        self.shape
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    /// Dense weights in row-major order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Number of cells that count as neighbors
    pub fn capacity(&self) -> usize {
        self.taps.len()
    }

    /// Weight at the center of the block
    pub fn center_weight(&self) -> f64 {
        self.weights[self.weights.len() / 2]
    }
}

/// Offset from the block center of the `i`-th entry of a 3^d block
fn block_offset(mut i: usize, dimensionality: usize) -> [isize; MAX_DIMS] {
    let mut offset = [0; MAX_DIMS];
    for axis in (0..dimensionality).rev() {
        offset[axis] = (i % 3) as isize - 1;
        i /= 3;
    }
    offset
}

/// Cache of shared kernels keyed by topology and dimensionality.
#[derive(Default)]
pub struct KernelLibrary {
    cache: Mutex<HashMap<(KernelShape, usize), Arc<Kernel>>>,
}

impl KernelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (building on first use) the kernel for `name`
    pub fn get(&self, name: &str, dimensionality: usize) -> GrowthResult<Arc<Kernel>> {
        let shape = KernelShape::parse(name, dimensionality)?;
        // A poisoned lock only means another caller panicked mid-insert
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cache
            .entry((shape, dimensionality))
            .or_insert_with(|| Arc::new(Kernel::from_shape(shape, dimensionality)))
            .clone())
    }
}
