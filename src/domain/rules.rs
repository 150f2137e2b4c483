use super::error::{GrowthError, GrowthResult};
use super::kernel::{Kernel, KernelLibrary};
use std::sync::Arc;

/// Slack when comparing rescaled neighbor counts against range bounds
const COUNT_TOLERANCE: f64 = 1e-9;

/// Inclusive range of neighbor counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdRange {
    low: f64,
    high: f64,
}

impl ThresholdRange {
    pub fn new(low: f64, high: f64) -> GrowthResult<Self> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(GrowthError::InvalidParameter(format!(
                "threshold range {low}..={high} must be finite with low <= high"
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Check a neighbor count against the bounds
    pub fn contains(&self, count: f64) -> bool {
        count >= self.low - COUNT_TOLERANCE && count <= self.high + COUNT_TOLERANCE
    }
}

/// Survive/birth rule bound to a neighborhood kernel.
///
/// Ranges are measured in neighbors: the engine rescales the normalized
/// neighbor field by the kernel capacity before testing them.
#[derive(Clone, Debug)]
pub struct PatternRule {
    name: String,
    kernel: Arc<Kernel>,
    survive: ThresholdRange,
    birth: ThresholdRange,
    colors: Vec<String>,
    noise: Option<f64>,
}

impl PatternRule {
    pub fn new(
        name: impl Into<String>,
        kernel: Arc<Kernel>,
        survive: (f64, f64),
        birth: (f64, f64),
        colors: &[&str],
    ) -> GrowthResult<Self> {
        Ok(Self {
            name: name.into(),
            kernel,
            survive: ThresholdRange::new(survive.0, survive.1)?,
            birth: ThresholdRange::new(birth.0, birth.1)?,
            colors: colors.iter().map(|c| c.to_string()).collect(),
            noise: None,
        })
    }

    /// Add uniform noise in `[0, amplitude)` to every cell after each generation
    pub fn with_noise(mut self, amplitude: f64) -> GrowthResult<Self> {
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(GrowthError::InvalidParameter(format!(
                "noise amplitude {amplitude} must lie in [0, 1]"
            )));
        }
        self.noise = (amplitude > 0.0).then_some(amplitude);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn survive(&self) -> ThresholdRange {
        self.survive
    }

    pub fn birth(&self) -> ThresholdRange {
        self.birth
    }

    /// Display colors, opaque to the engine
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn noise(&self) -> Option<f64> {
        self.noise
    }

    /// Next state of one cell given its neighbor field value.
    /// Does not include noise.
    pub fn evolve(&self, current: f64, field: f64) -> f64 {
        let count = field * self.kernel.capacity() as f64;
        let alive = if current > 0.0 {
            self.survive.contains(count)
        } else {
            current == 0.0 && self.birth.contains(count)
        };
        if alive { 1.0 } else { 0.0 }
    }
}

/// Flat table of named rules for one dimensionality.
#[derive(Clone, Debug)]
pub struct RuleBook {
    dimensionality: usize,
    rules: Vec<PatternRule>,
}

impl RuleBook {
    /// Coral, lichen and mycelium for 2D grids
    pub fn planar(library: &KernelLibrary) -> GrowthResult<Self> {
        let moore = library.get("moore", 2)?;
        let von_neumann = library.get("von_neumann", 2)?;
        Ok(Self {
            dimensionality: 2,
            rules: vec![
                PatternRule::new("coral", moore.clone(), (2.0, 3.0), (3.0, 3.0), &["YlOrRd"])?,
                PatternRule::new("lichen", von_neumann, (1.0, 3.0), (2.0, 3.0), &["YlGn"])?,
                PatternRule::new("mycelium", moore, (2.0, 4.0), (2.0, 3.0), &["copper"])?
                    .with_noise(0.1)?,
            ],
        })
    }

    /// Coral, mycelium and crystal for 3D grids
    pub fn volumetric(library: &KernelLibrary) -> GrowthResult<Self> {
        Ok(Self {
            dimensionality: 3,
            rules: vec![
                PatternRule::new(
                    "coral",
                    library.get("sphere_approx", 3)?,
                    (4.0, 6.0),
                    (4.0, 5.0),
                    &["darkred", "red", "orange", "yellow"],
                )?,
                PatternRule::new(
                    "mycelium",
                    library.get("diamond", 3)?,
                    (3.0, 6.0),
                    (3.0, 4.0),
                    &["saddlebrown", "peru", "burlywood", "wheat"],
                )?,
                PatternRule::new(
                    "crystal",
                    library.get("cube", 3)?,
                    (4.0, 7.0),
                    (5.0, 6.0),
                    &["darkblue", "blue", "lightblue", "white"],
                )?,
            ],
        })
    }

    /// Preset table matching a grid's dimensionality
    pub fn for_dimensionality(library: &KernelLibrary, dimensionality: usize) -> GrowthResult<Self> {
        match dimensionality {
            2 => Self::planar(library),
            3 => Self::volumetric(library),
            n => Err(GrowthError::InvalidShape(format!("no rule table for {n}D grids"))),
        }
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> GrowthResult<&PatternRule> {
        self.rules
            .iter()
            .find(|rule| rule.name == name)
            .ok_or_else(|| GrowthError::UnknownPattern(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar() -> RuleBook {
        RuleBook::planar(&KernelLibrary::new()).unwrap()
    }

    #[test]
    fn test_coral_rules() {
        let book = planar();
        let rule = book.get("coral").unwrap();
        let eighth = 1.0 / 8.0;

        // Underpopulation
        assert_eq!(rule.evolve(1.0, 0.0), 0.0);
        assert_eq!(rule.evolve(1.0, eighth), 0.0);

        // Survival
        assert_eq!(rule.evolve(1.0, 2.0 * eighth), 1.0);
        assert_eq!(rule.evolve(1.0, 3.0 * eighth), 1.0);

        // Overpopulation
        assert_eq!(rule.evolve(1.0, 4.0 * eighth), 0.0);

        // Birth
        assert_eq!(rule.evolve(0.0, 3.0 * eighth), 1.0);
        assert_eq!(rule.evolve(0.0, 2.0 * eighth), 0.0);
    }

    #[test]
    fn test_hazy_cells_count_as_alive() {
        let book = planar();
        let rule = book.get("mycelium").unwrap();
        assert_eq!(rule.evolve(0.05, 4.0 / 8.0), 1.0);
        assert_eq!(rule.evolve(0.05, 1.0 / 8.0), 0.0);
    }

    #[test]
    fn test_tolerance_on_cube_fractions() {
        // 1/26 sums do not land exactly on integers
        let book = RuleBook::volumetric(&KernelLibrary::new()).unwrap();
        let rule = book.get("crystal").unwrap();
        let field: f64 = (0..5).map(|_| 1.0 / 26.0).sum();
        assert_eq!(rule.evolve(0.0, field), 1.0);
    }

    #[test]
    fn test_only_mycelium_is_noisy() {
        let book = planar();
        let noisy: Vec<_> = book.iter().filter(|r| r.noise().is_some()).map(|r| r.name()).collect();
        assert_eq!(noisy, vec!["mycelium"]);
    }

    #[test]
    fn test_malformed_ranges() {
        let kernel = Arc::new(Kernel::build("moore", 2).unwrap());
        let err = PatternRule::new("bad", kernel.clone(), (3.0, 2.0), (3.0, 3.0), &[]);
        assert!(matches!(err, Err(GrowthError::InvalidParameter(_))));
        let rule = PatternRule::new("ok", kernel, (2.0, 3.0), (3.0, 3.0), &[]).unwrap();
        assert!(rule.with_noise(1.5).is_err());
    }

    #[test]
    fn test_lookup() {
        let book = planar();
        assert_eq!(book.names().collect::<Vec<_>>(), vec!["coral", "lichen", "mycelium"]);
        assert!(matches!(book.get("crystal"), Err(GrowthError::UnknownPattern(_))));
        assert!(RuleBook::volumetric(&KernelLibrary::new()).unwrap().get("crystal").is_ok());
        assert!(RuleBook::for_dimensionality(&KernelLibrary::new(), 4).is_err());
    }

    #[test]
    fn test_colors_are_opaque() {
        let book = RuleBook::volumetric(&KernelLibrary::new()).unwrap();
        assert_eq!(book.get("coral").unwrap().colors().len(), 4);
    }
}
