//! Initial grid states.
//!
//! Every strategy returns a fresh grid with cells in {0, 1}. Replacing an
//! engine's grid with the result is up to the caller.

use super::error::{GrowthError, GrowthResult};
use super::grid::{Grid, validate_shape};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Each cell alive independently with probability `density`
pub fn seed_random<R: Rng>(shape: &[usize], density: f64, rng: &mut R) -> GrowthResult<Grid> {
    if !(0.0..=1.0).contains(&density) {
        return Err(GrowthError::InvalidParameter(format!(
            "seed density {density} must lie in [0, 1]"
        )));
    }
    validate_shape(shape)?;
    let volume: usize = shape.iter().product();
    let cells = (0..volume)
        .map(|_| if rng.random_bool(density) { 1.0 } else { 0.0 })
        .collect();
    let grid = Grid::from_cells(shape, cells)?;
    debug!(density, active = grid.active_count(0.0), "seeded random grid");
    Ok(grid)
}

/// Filled disc (or ball) of `radius` around the grid center.
///
/// The center sits at `extent / 2` on every axis.
pub fn seed_center(shape: &[usize], radius: f64) -> GrowthResult<Grid> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GrowthError::InvalidParameter(format!(
            "seed radius {radius} must be a non-negative number"
        )));
    }
    let blank = Grid::new(shape)?;
    let center: Vec<f64> = shape.iter().map(|&e| (e / 2) as f64).collect();
    let cells: Vec<f64> = blank
        .iter_cells()
        .map(|(coords, _)| {
            let dist_sq: f64 = coords
                .iter()
                .zip(&center)
                .map(|(&c, &m)| (c as f64 - m).powi(2))
                .sum();
            if dist_sq <= radius * radius { 1.0 } else { 0.0 }
        })
        .collect();
    let grid = Grid::from_cells(shape, cells)?;
    debug!(radius, active = grid.active_count(0.0), "seeded center region");
    Ok(grid)
}

/// Horizontal line through the middle row covering the middle half of the width
pub fn seed_line(shape: &[usize]) -> GrowthResult<Grid> {
    let &[height, width] = shape else {
        return Err(GrowthError::InvalidShape(format!(
            "line seeding needs a 2D shape, got {:?}",
            shape
        )));
    };
    let mut grid = Grid::new(shape)?;
    for x in width / 4..3 * width / 4 {
        grid.set(&[height / 2, x], 1.0);
    }
    debug!(active = grid.active_count(0.0), "seeded line");
    Ok(grid)
}

/// Serializable choice of seeding strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedStrategy {
    Random { density: f64 },
    Center { radius: f64 },
    Line,
}

impl Default for SeedStrategy {
    fn default() -> Self {
        Self::Random { density: 0.3 }
    }
}

impl SeedStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random { .. } => "random",
            Self::Center { .. } => "center",
            Self::Line => "line",
        }
    }

    /// Produce a grid of `shape` with this strategy
    pub fn generate<R: Rng>(&self, shape: &[usize], rng: &mut R) -> GrowthResult<Grid> {
        match *self {
            Self::Random { density } => seed_random(shape, density, rng),
            Self::Center { radius } => seed_center(shape, radius),
            Self::Line => seed_line(shape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn live_coords(grid: &Grid) -> Vec<Vec<usize>> {
        grid.iter_cells()
            .filter(|(_, v)| *v > 0.0)
            .map(|(coords, _)| coords)
            .collect()
    }

    #[test]
    fn test_center_radius_one_is_plus() {
        let grid = seed_center(&[5, 5], 1.0).unwrap();
        assert_eq!(
            live_coords(&grid),
            vec![vec![1, 2], vec![2, 1], vec![2, 2], vec![2, 3], vec![3, 2]]
        );
    }

    #[test]
    fn test_center_zero_radius_single_cell() {
        let grid = seed_center(&[4, 6], 0.0).unwrap();
        assert_eq!(live_coords(&grid), vec![vec![2, 3]]);
    }

    #[test]
    fn test_center_3d_ball() {
        let grid = seed_center(&[7, 7, 7], 1.0).unwrap();
        // Center plus its six face neighbors
        assert_eq!(grid.active_count(0.0), 7);
        assert_eq!(grid.get(&[3, 3, 3]), Some(1.0));
        assert_eq!(grid.get(&[3, 4, 4]), Some(0.0));
    }

    #[test]
    fn test_center_rejects_negative_radius() {
        assert!(matches!(seed_center(&[5, 5], -1.0), Err(GrowthError::InvalidParameter(_))));
    }

    #[test]
    fn test_line() {
        let grid = seed_line(&[8, 8]).unwrap();
        assert_eq!(
            live_coords(&grid),
            vec![vec![4, 2], vec![4, 3], vec![4, 4], vec![4, 5]]
        );
        assert!(matches!(seed_line(&[4, 4, 4]), Err(GrowthError::InvalidShape(_))));
    }

    #[test]
    fn test_random_density_bounds() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        assert!(matches!(
            seed_random(&[4, 4], 1.5, &mut rng),
            Err(GrowthError::InvalidParameter(_))
        ));
        assert!(seed_random(&[4, 4], f64::NAN, &mut rng).is_err());
        assert_eq!(seed_random(&[4, 4], 0.0, &mut rng).unwrap().active_count(0.0), 0);
        assert_eq!(seed_random(&[4, 4], 1.0, &mut rng).unwrap().active_count(0.0), 16);
    }

    #[test]
    fn test_random_is_binary_and_reproducible() {
        let a = seed_random(&[20, 20], 0.3, &mut ChaCha12Rng::seed_from_u64(42)).unwrap();
        let b = seed_random(&[20, 20], 0.3, &mut ChaCha12Rng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert!(a.cells().iter().all(|&v| v == 0.0 || v == 1.0));
        let active = a.active_count(0.0);
        assert!(active > 60 && active < 180, "active = {active}");
    }

    #[test]
    fn test_strategy_from_json() {
        let strategy: SeedStrategy = serde_json::from_str(r#"{"kind":"center","radius":3.0}"#).unwrap();
        assert_eq!(strategy, SeedStrategy::Center { radius: 3.0 });
        let line: SeedStrategy = serde_json::from_str(r#"{"kind":"line"}"#).unwrap();
        assert_eq!(line.name(), "line");
    }
}
