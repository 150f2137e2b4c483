use super::error::{GrowthError, GrowthResult};
use super::grid::Grid;

/// Copy of the grid at one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    generation: usize,
    grid: Grid,
}

impl Snapshot {
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// Append-only record of every generation, starting with the seed.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    snapshots: Vec<Snapshot>,
}

impl HistoryBuffer {
    /// Start a history whose generation 0 is `seed`
    pub fn new(seed: &Grid) -> Self {
        Self {
            snapshots: vec![Snapshot { generation: 0, grid: seed.clone() }],
        }
    }

    /// Store a copy of `grid` as the next generation
    pub fn push(&mut self, grid: &Grid) {
        let generation = self.snapshots.len();
        self.snapshots.push(Snapshot { generation, grid: grid.clone() });
    }

    pub fn get(&self, index: usize) -> GrowthResult<&Snapshot> {
        self.snapshots.get(index).ok_or(GrowthError::IndexOutOfRange {
            index,
            len: self.snapshots.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: the seed snapshot is never removed
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> &Snapshot {
        // `new` guarantees at least the seed
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }
}
