use super::config::GrowthConfig;
use crate::domain::{
    EnvironmentField, GrowthEngine, GrowthResult, KernelLibrary, PatternRule, RuleBook,
};
use tracing::info;

/// Outcome of a [`GrowthSession::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub pattern: String,
    /// Active cells per generation, index 0 being the seed
    pub active_counts: Vec<usize>,
    pub extinct: bool,
    /// Whether the environment field was applied to the final grid
    pub environment_applied: bool,
}

impl RunSummary {
    pub fn generations_run(&self) -> usize {
        self.active_counts.len() - 1
    }

    pub fn final_active(&self) -> usize {
        self.active_counts.last().copied().unwrap_or(0)
    }
}

/// GrowthSession orchestrates one run: seed, grow with early stop, then
/// post-process with the environment.
pub struct GrowthSession {
    config: GrowthConfig,
    rules: RuleBook,
    engine: GrowthEngine,
}

impl GrowthSession {
    pub fn new(config: GrowthConfig) -> GrowthResult<Self> {
        config.validate()?;
        let library = KernelLibrary::new();
        let rules = RuleBook::for_dimensionality(&library, config.shape.len())?;
        rules.get(&config.pattern)?;

        let engine = GrowthEngine::seeded(&config.shape, config.seed_strategy, config.seed)?
            .with_execution(config.execution);
        info!(
            pattern = %config.pattern,
            seed_strategy = config.seed_strategy.name(),
            shape = ?config.shape,
            active = engine.grid().active_count(config.active_threshold),
            "seeded"
        );
        Ok(Self { config, rules, engine })
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn engine(&self) -> &GrowthEngine {
        &self.engine
    }

    pub fn rule(&self) -> GrowthResult<&PatternRule> {
        self.rules.get(&self.config.pattern)
    }

    /// Grow until the generation budget is spent or the pattern dies out
    pub fn run(&mut self) -> GrowthResult<RunSummary> {
        let rule = self.rules.get(&self.config.pattern)?;
        let threshold = self.config.active_threshold;
        let mut active_counts = vec![self.engine.grid().active_count(threshold)];

        for generation in 1..=self.config.generations {
            self.engine.grow(rule, 1)?;
            let active = self.engine.grid().active_count(threshold);
            active_counts.push(active);

            if self.config.log_every > 0 && generation % self.config.log_every == 0 {
                info!(generation, active, "progress");
            }
            if active == 0 {
                info!(generation, "pattern died out");
                break;
            }
        }

        let extinct = active_counts.last() == Some(&0);
        let environment_applied = match self.config.environment {
            Some(kind) if !extinct => {
                let field = EnvironmentField::build(&self.config.shape, kind)?;
                self.engine.apply_environment(&field)?;
                true
            }
            _ => false,
        };

        let summary = RunSummary {
            pattern: self.config.pattern.clone(),
            active_counts,
            extinct,
            environment_applied,
        };
        info!(
            pattern = %summary.pattern,
            generations = summary.generations_run(),
            active = summary.final_active(),
            extinct,
            "run finished"
        );
        Ok(summary)
    }
}
