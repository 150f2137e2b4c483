//! The generation-update loop.
//!
//! Each generation convolves the current grid with the rule's kernel,
//! thresholds the neighbor counts into survivors and births, optionally adds
//! noise, and swaps in the new grid. The next grid is always built from the
//! previous generation alone; no cell sees a partially updated neighbor.

use super::environment::EnvironmentField;
use super::error::{GrowthError, GrowthResult};
use super::execution::Execution;
use super::grid::Grid;
use super::history::HistoryBuffer;
use super::rules::PatternRule;
use super::seed::SeedStrategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use tracing::{debug, warn};

/// Owns one grid, its history and the random stream used to perturb it.
pub struct GrowthEngine {
    grid: Grid,
    history: HistoryBuffer,
    rng: ChaCha12Rng,
    execution: Execution,
}

impl GrowthEngine {
    /// Start from `grid` with a deterministic random stream
    pub fn new(grid: Grid, seed: u64) -> Self {
        Self {
            history: HistoryBuffer::new(&grid),
            grid,
            rng: ChaCha12Rng::seed_from_u64(seed),
            execution: Execution::default(),
        }
    }

    /// Seed a new grid of `shape` using the engine's own random stream
    pub fn seeded(shape: &[usize], strategy: SeedStrategy, seed: u64) -> GrowthResult<Self> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let grid = strategy.generate(shape, &mut rng)?;
        Ok(Self {
            history: HistoryBuffer::new(&grid),
            grid,
            rng,
            execution: Execution::default(),
        })
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    /// Generations evolved since the last seed
    pub fn generation(&self) -> usize {
        self.history.len() - 1
    }

    /// Cells with any positive value
    pub fn active_count(&self) -> usize {
        self.grid.active_count(0.0)
    }

    /// Replace the grid and restart history from it; the shape must not change
    pub fn reseed(&mut self, grid: Grid) -> GrowthResult<()> {
        if grid.shape() != self.grid.shape() {
            return Err(GrowthError::InvalidShape(format!(
                "cannot reseed a {:?} engine with a {:?} grid",
                self.grid.shape(),
                grid.shape()
            )));
        }
        self.history = HistoryBuffer::new(&grid);
        self.grid = grid;
        Ok(())
    }

    /// Reseed with `strategy`, drawing randomness from the engine's stream
    pub fn reseed_with(&mut self, strategy: SeedStrategy) -> GrowthResult<()> {
        let grid = strategy.generate(self.grid.shape(), &mut self.rng)?;
        self.reseed(grid)
    }

    /// Advance `generations` steps under `rule` and return the active-cell count.
    ///
    /// Extinction is not an error: the grid stays all-zero and the count is 0.
    pub fn grow(&mut self, rule: &PatternRule, generations: usize) -> GrowthResult<usize> {
        if rule.kernel().dimensionality() != self.grid.dimensionality() {
            return Err(GrowthError::InvalidShape(format!(
                "rule {:?} uses a {}D kernel but the grid is {}D",
                rule.name(),
                rule.kernel().dimensionality(),
                self.grid.dimensionality()
            )));
        }
        for _ in 0..generations {
            self.step(rule)?;
        }
        Ok(self.active_count())
    }

    fn step(&mut self, rule: &PatternRule) -> GrowthResult<()> {
        let was_extinct = self.grid.is_extinct();
        let field = match self.execution {
            Execution::Serial => self.grid.neighbor_field(rule.kernel())?,
            Execution::Parallel => self.grid.neighbor_field_parallel(rule.kernel())?,
        };

        let mut next: Vec<f64> = self
            .grid
            .cells()
            .iter()
            .zip(&field)
            .map(|(&current, &neighbors)| rule.evolve(current, neighbors))
            .collect();

        if let Some(amplitude) = rule.noise() {
            for cell in &mut next {
                *cell = (*cell + self.rng.random::<f64>() * amplitude).clamp(0.0, 1.0);
            }
        }

        self.grid = Grid::from_cells(self.grid.shape(), next)?;
        self.history.push(&self.grid);

        let active = self.active_count();
        debug!(generation = self.generation(), rule = rule.name(), active, "grew");
        if active == 0 && !was_extinct {
            warn!(generation = self.generation(), rule = rule.name(), "no active cells remaining");
        }
        Ok(())
    }

    /// Multiply the current grid by an environment field.
    /// History is left as recorded.
    pub fn apply_environment(&mut self, field: &EnvironmentField) -> GrowthResult<()> {
        field.apply_in_place(&mut self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::environment::FieldKind;
    use crate::domain::kernel::KernelLibrary;
    use crate::domain::rules::RuleBook;
    use crate::domain::seed::{seed_center, seed_random};

    fn planar() -> RuleBook {
        RuleBook::planar(&KernelLibrary::new()).unwrap()
    }

    fn live_coords(grid: &Grid) -> Vec<Vec<usize>> {
        grid.iter_cells()
            .filter(|(_, v)| *v > 0.0)
            .map(|(coords, _)| coords)
            .collect()
    }

    #[test]
    fn test_coral_from_plus_seed() {
        let book = planar();
        let mut engine = GrowthEngine::new(seed_center(&[5, 5], 1.0).unwrap(), 0);
        let active = engine.grow(book.get("coral").unwrap(), 1).unwrap();

        // Arms keep 3 neighbors, corners are born with 3, the center has 4 and dies
        assert_eq!(active, 8);
        assert_eq!(
            live_coords(engine.grid()),
            vec![
                vec![1, 1], vec![1, 2], vec![1, 3],
                vec![2, 1], vec![2, 3],
                vec![3, 1], vec![3, 2], vec![3, 3],
            ]
        );
    }

    #[test]
    fn test_zero_generations_is_noop() {
        let book = planar();
        let seed = seed_random(&[12, 9], 0.4, &mut ChaCha12Rng::seed_from_u64(3)).unwrap();
        let mut engine = GrowthEngine::new(seed.clone(), 0);
        for name in ["coral", "lichen", "mycelium"] {
            engine.grow(book.get(name).unwrap(), 0).unwrap();
        }
        assert_eq!(engine.grid(), &seed);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_blinker_oscillates() {
        // Coral is B3/S23, so a blinker must flip each generation
        let book = planar();
        let coral = book.get("coral").unwrap();
        let mut grid = Grid::new(&[5, 5]).unwrap();
        for x in 1..4 {
            grid.set(&[2, x], 1.0);
        }
        let mut engine = GrowthEngine::new(grid.clone(), 0);

        engine.grow(coral, 1).unwrap();
        assert_eq!(live_coords(engine.grid()), vec![vec![1, 2], vec![2, 2], vec![3, 2]]);
        engine.grow(coral, 1).unwrap();
        assert_eq!(engine.grid(), &grid);
    }

    #[test]
    fn test_wraparound_birth() {
        // Three cells in column 0 give birth in column 4 through the seam
        let book = planar();
        let mut grid = Grid::new(&[6, 6]).unwrap();
        for y in 1..4 {
            grid.set(&[y, 0], 1.0);
        }
        let mut engine = GrowthEngine::new(grid, 0);
        engine.grow(book.get("coral").unwrap(), 1).unwrap();
        assert_eq!(engine.grid().get(&[2, 5]), Some(1.0));
        assert_eq!(engine.grid().get(&[2, 1]), Some(1.0));
    }

    #[test]
    fn test_extinction_is_fixed_point() {
        let book = planar();
        let mut engine = GrowthEngine::new(Grid::new(&[8, 8]).unwrap(), 0);
        for name in ["coral", "lichen"] {
            assert_eq!(engine.grow(book.get(name).unwrap(), 3).unwrap(), 0);
            assert!(engine.grid().is_extinct());
        }
    }

    #[test]
    fn test_single_cell_dies_out() {
        let book = planar();
        let mut engine = GrowthEngine::new(seed_center(&[7, 7], 0.0).unwrap(), 0);
        assert_eq!(engine.grow(book.get("coral").unwrap(), 1).unwrap(), 0);
        assert_eq!(engine.grow(book.get("coral").unwrap(), 1).unwrap(), 0);
    }

    #[test]
    fn test_deterministic_without_noise() {
        let book = planar();
        let seed = seed_random(&[16, 16], 0.35, &mut ChaCha12Rng::seed_from_u64(11)).unwrap();
        let mut a = GrowthEngine::new(seed.clone(), 1);
        let mut b = GrowthEngine::new(seed, 2).with_execution(Execution::Serial);
        a.grow(book.get("lichen").unwrap(), 6).unwrap();
        b.grow(book.get("lichen").unwrap(), 6).unwrap();
        for i in 0..a.history().len() {
            assert_eq!(a.history().get(i).unwrap(), b.history().get(i).unwrap());
        }
    }

    #[test]
    fn test_mycelium_noise_is_hazy_and_reproducible() {
        let book = planar();
        let mycelium = book.get("mycelium").unwrap();
        let seed = seed_center(&[10, 10], 2.0).unwrap();

        let mut a = GrowthEngine::new(seed.clone(), 99);
        let mut b = GrowthEngine::new(seed.clone(), 99);
        let mut c = GrowthEngine::new(seed, 100);
        a.grow(mycelium, 2).unwrap();
        b.grow(mycelium, 2).unwrap();
        c.grow(mycelium, 2).unwrap();

        assert_eq!(a.grid(), b.grid());
        assert_ne!(a.grid(), c.grid());
        assert!(a.grid().cells().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(a.grid().cells().iter().any(|&v| v > 0.0 && v < 0.1));
    }

    #[test]
    fn test_history_tracks_generations() {
        let book = planar();
        let mut engine = GrowthEngine::new(seed_center(&[9, 9], 2.0).unwrap(), 0);
        for n in 1..=4 {
            engine.grow(book.get("coral").unwrap(), 1).unwrap();
            assert_eq!(engine.history().len(), n + 1);
        }
        engine.grow(book.get("coral").unwrap(), 3).unwrap();
        assert_eq!(engine.generation(), 7);
        assert_eq!(engine.history().latest().grid(), engine.grid());
    }

    #[test]
    fn test_mismatched_rule_leaves_state() {
        let volumetric = RuleBook::volumetric(&KernelLibrary::new()).unwrap();
        let seed = seed_center(&[6, 6], 1.0).unwrap();
        let mut engine = GrowthEngine::new(seed.clone(), 0);
        let err = engine.grow(volumetric.get("crystal").unwrap(), 1);
        assert!(matches!(err, Err(GrowthError::InvalidShape(_))));
        assert_eq!(engine.grid(), &seed);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_volumetric_coral_grows() {
        let volumetric = RuleBook::volumetric(&KernelLibrary::new()).unwrap();
        let mut engine = GrowthEngine::seeded(&[8, 8, 8], SeedStrategy::Center { radius: 2.0 }, 5).unwrap();
        let before = engine.active_count();
        let after = engine.grow(volumetric.get("coral").unwrap(), 1).unwrap();
        assert!(after > 0);
        assert_ne!(before, after);
    }

    #[test]
    fn test_reseed_resets_history() {
        let book = planar();
        let mut engine = GrowthEngine::seeded(&[10, 10], SeedStrategy::Line, 0).unwrap();
        engine.grow(book.get("coral").unwrap(), 2).unwrap();
        engine.reseed_with(SeedStrategy::Random { density: 0.5 }).unwrap();
        assert_eq!(engine.history().len(), 1);
        assert!(engine.reseed(Grid::new(&[3, 3]).unwrap()).is_err());
    }

    #[test]
    fn test_environment_attenuates_current_grid() {
        let mut engine = GrowthEngine::seeded(&[10, 10], SeedStrategy::Center { radius: 4.0 }, 0).unwrap();
        let before = engine.grid().clone();
        let field = EnvironmentField::build(&[10, 10], FieldKind::light()).unwrap();
        engine.apply_environment(&field).unwrap();
        for (after, before) in engine.grid().cells().iter().zip(before.cells()) {
            assert!(after <= before);
        }
        assert_eq!(engine.history().latest().grid(), &before);
    }
}
