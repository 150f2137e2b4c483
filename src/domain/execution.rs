//! Selects how the neighbor field is computed.
//!
//! Both strategies produce bit-identical fields; parallel is faster for
//! large grids and the serial path is handy for benchmarking and debugging.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// One cell after another on the calling thread
    Serial,
    /// Cells split across the rayon thread pool
    #[default]
    Parallel,
}

impl Execution {
    pub fn all() -> Vec<Execution> {
        vec![Execution::Serial, Execution::Parallel]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Execution::Serial => "Serial",
            Execution::Parallel => "Parallel",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Execution::Serial => "Periodic convolution, single thread",
            Execution::Parallel => "Periodic convolution, rayon work-stealing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_parallel() {
        assert_eq!(Execution::default(), Execution::Parallel);
    }

    #[test]
    fn test_names_are_unique() {
        let names: Vec<_> = Execution::all().iter().map(|e| e.name()).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Execution::Serial).unwrap(), "\"serial\"");
    }
}
