//! Environmental influences applied to a grid after growth.
//!
//! A field is a precomputed array of attenuation factors in [0, 1] with the
//! same shape as the grid. Applying it multiplies cell values element-wise,
//! so modulation can only dim cells, never brighten them.

use super::error::{GrowthError, GrowthResult};
use super::grid::{Grid, validate_shape};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of spatial gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Linear ramp down the rows, from `low` at the first row to `high` at the last
    Vertical { low: f64, high: f64 },
    /// `1 - falloff * d^2 / norm` around the center, clipped to `[floor, ceiling]`
    Radial { falloff: f64, floor: f64, ceiling: f64 },
}

impl FieldKind {
    /// Moisture rising toward the bottom rows
    pub const fn moisture() -> Self {
        Self::Vertical { low: 0.5, high: 1.0 }
    }

    /// Light fading away from the center
    pub const fn light() -> Self {
        Self::Radial { falloff: 0.5, floor: 0.3, ceiling: 1.0 }
    }

    pub fn validate(&self) -> GrowthResult<()> {
        let (low, high) = match *self {
            Self::Vertical { low, high } => (low, high),
            Self::Radial { falloff, floor, ceiling } => {
                if !falloff.is_finite() || falloff < 0.0 {
                    return Err(GrowthError::InvalidParameter(format!(
                        "radial falloff {falloff} must be a non-negative number"
                    )));
                }
                (floor, ceiling)
            }
        };
        if !(0.0 <= low && low <= high && high <= 1.0) {
            return Err(GrowthError::InvalidParameter(format!(
                "environment bounds {low}..={high} must satisfy 0 <= low <= high <= 1"
            )));
        }
        Ok(())
    }
}

impl FromStr for FieldKind {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moisture" | "vertical" => Ok(Self::moisture()),
            "light" | "radial" => Ok(Self::light()),
            other => Err(GrowthError::InvalidParameter(format!(
                "unknown environment factor {other:?}"
            ))),
        }
    }
}

/// Precomputed attenuation factors for one grid shape.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentField {
    kind: FieldKind,
    shape: Vec<usize>,
    factors: Vec<f64>,
}

impl EnvironmentField {
    pub fn build(shape: &[usize], kind: FieldKind) -> GrowthResult<Self> {
        validate_shape(shape)?;
        kind.validate()?;
        let blank = Grid::new(shape)?;
        let factors = match kind {
            FieldKind::Vertical { low, high } => {
                let row_axis = shape.len() - 2;
                let rows = shape[row_axis];
                blank
                    .iter_cells()
                    .map(|(c, _)| {
                        if rows == 1 {
                            low
                        } else {
                            low + (high - low) * c[row_axis] as f64 / (rows - 1) as f64
                        }
                    })
                    .collect()
            }
            FieldKind::Radial { falloff, floor, ceiling } => {
                let center: Vec<f64> = shape.iter().map(|&e| (e / 2) as f64).collect();
                // Reduces to width * height / 4 for 2D grids
                let norm = shape
                    .iter()
                    .map(|&e| e as f64 / 2.0)
                    .product::<f64>()
                    .powf(2.0 / shape.len() as f64);
                blank
                    .iter_cells()
                    .map(|(c, _)| {
                        let dist_sq: f64 = c
                            .iter()
                            .zip(&center)
                            .map(|(&x, &m)| (x as f64 - m).powi(2))
                            .sum();
                        (1.0 - falloff * dist_sq / norm).clamp(floor, ceiling)
                    })
                    .collect()
            }
        };
        Ok(Self { kind, shape: shape.to_vec(), factors })
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// Return a modulated copy of `grid`
    pub fn apply(&self, grid: &Grid) -> GrowthResult<Grid> {
        let mut out = grid.clone();
        self.apply_in_place(&mut out)?;
        Ok(out)
    }

    pub fn apply_in_place(&self, grid: &mut Grid) -> GrowthResult<()> {
        if grid.shape() != self.shape.as_slice() {
            return Err(GrowthError::InvalidShape(format!(
                "field shape {:?} does not match grid shape {:?}",
                self.shape,
                grid.shape()
            )));
        }
        let cells = grid
            .cells()
            .iter()
            .zip(&self.factors)
            .map(|(v, f)| v * f)
            .collect();
        *grid = Grid::from_cells(&self.shape, cells)?;
        Ok(())
    }
}
