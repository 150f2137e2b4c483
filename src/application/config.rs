use crate::domain::{Execution, FieldKind, GrowthError, GrowthResult, SeedStrategy, validate_shape};
use serde::{Deserialize, Serialize};

/// Settings for one headless growth run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrowthConfig {
    /// Seed for every random draw in the run (seeding and noise).
    pub seed: u64,
    /// Grid extents, `[height, width]` or `[depth, height, width]`.
    pub shape: Vec<usize>,
    /// Rule name looked up in the table for the grid's dimensionality.
    pub pattern: String,
    pub seed_strategy: SeedStrategy,
    /// Upper bound on generations; the run stops early on extinction.
    pub generations: usize,
    /// Log the active-cell count every this many generations (0 disables).
    pub log_every: usize,
    /// Cells strictly above this value count as active.
    pub active_threshold: f64,
    /// Applied once to the final grid if the pattern survived.
    pub environment: Option<FieldKind>,
    pub execution: Execution,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            shape: vec![100, 100],
            pattern: "coral".to_string(),
            seed_strategy: SeedStrategy::default(),
            generations: 30,
            log_every: 5,
            active_threshold: 0.0,
            environment: Some(FieldKind::light()),
            execution: Execution::default(),
        }
    }
}

impl GrowthConfig {
    /// Reject values that would fail partway through a run
    pub fn validate(&self) -> GrowthResult<()> {
        validate_shape(&self.shape)?;
        if !self.active_threshold.is_finite() || self.active_threshold < 0.0 {
            return Err(GrowthError::InvalidParameter(format!(
                "active threshold {} must be a non-negative number",
                self.active_threshold
            )));
        }
        if let Some(kind) = &self.environment {
            kind.validate()?;
        }
        if matches!(self.seed_strategy, SeedStrategy::Line) && self.shape.len() != 2 {
            return Err(GrowthError::InvalidShape(
                "line seeding needs a 2D shape".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GrowthConfig = serde_json::from_str(
            r#"{
                "pattern": "crystal",
                "shape": [30, 30, 30],
                "seed_strategy": { "kind": "center", "radius": 3.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.pattern, "crystal");
        assert_eq!(config.seed, 42);
        assert_eq!(config.generations, 30);
        assert_eq!(config.environment, Some(FieldKind::light()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_can_be_disabled() {
        let config: GrowthConfig = serde_json::from_str(r#"{ "environment": null }"#).unwrap();
        assert_eq!(config.environment, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = GrowthConfig { shape: vec![10], ..Default::default() };
        assert!(config.validate().is_err());

        let config = GrowthConfig {
            shape: vec![8, 8, 8],
            seed_strategy: SeedStrategy::Line,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GrowthError::InvalidShape(_))));

        let config = GrowthConfig { active_threshold: -0.5, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_serializes() {
        let json = serde_json::to_string(&GrowthConfig::default()).unwrap();
        let back: GrowthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GrowthConfig::default());
    }
}
