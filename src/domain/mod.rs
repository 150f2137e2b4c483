mod error;
mod grid;
mod kernel;
mod rules;
mod seed;
mod history;
mod environment;
mod execution;
mod engine;

pub use error::{GrowthError, GrowthResult};
pub use grid::{Grid, MAX_DIMS};
pub(crate) use grid::validate_shape;
pub use kernel::{Kernel, KernelLibrary, KernelShape, Tap};
pub use rules::{PatternRule, RuleBook, ThresholdRange};
pub use seed::{SeedStrategy, seed_center, seed_line, seed_random};
pub use history::{HistoryBuffer, Snapshot};
pub use environment::{EnvironmentField, FieldKind};
pub use execution::Execution;
pub use engine::GrowthEngine;
