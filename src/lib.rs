// Domain layer - Kernels, rules, seeding, the growth engine
pub mod domain;

// Application layer - Run configuration and orchestration
pub mod application;

// Re-exports for convenience
pub use domain::{
    EnvironmentField, FieldKind, Grid, GrowthEngine, GrowthError, GrowthResult, HistoryBuffer,
    Kernel, KernelLibrary, PatternRule, RuleBook, SeedStrategy,
};
pub use application::{GrowthConfig, GrowthSession, RunSummary};
