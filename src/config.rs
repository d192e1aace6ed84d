//! Configuration for leakage trace generation.

use serde::{Deserialize, Serialize};

/// Name of the pipeline stage the built-in models read by default.
pub const EXECUTE_STAGE: &str = "Execute";

/// How the Power model pairs operands when computing cross-cycle bit flips.
///
/// The first flip vector always compares the current instruction's first
/// operand with the previous instruction's second operand. The variants
/// differ only in what the second flip vector compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlipPairing {
    /// Second flip compares operand 2 of the current and previous instructions.
    #[default]
    Symmetric,

    /// Second flip repeats the first pairing, so both flip features are equal.
    ///
    /// Matches coefficient sets calibrated against models that computed the
    /// two flips from the same operand pair.
    Duplicated,
}

impl std::fmt::Display for FlipPairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlipPairing::Symmetric => write!(f, "Symmetric"),
            FlipPairing::Duplicated => write!(f, "Duplicated"),
        }
    }
}

/// Options shared by every model built through the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline stage whose occupant drives the leakage sample.
    ///
    /// Default: `"Execute"`.
    pub stage: String,

    /// Operand pairing for the Power model's flip features.
    ///
    /// Default: [`FlipPairing::Symmetric`].
    pub flip_pairing: FlipPairing,

    /// Spread per-cycle work across the rayon thread pool.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    /// Default: true.
    pub parallel: bool,

    /// Executions shorter than this are always generated sequentially.
    ///
    /// Default: 4096.
    pub min_parallel_cycles: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stage: EXECUTE_STAGE.to_string(),
            flip_pairing: FlipPairing::default(),
            parallel: true,
            min_parallel_cycles: 4096,
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a different pipeline stage.
    ///
    /// # Panics
    ///
    /// Panics if `stage` is empty.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        let stage = stage.into();
        assert!(!stage.is_empty(), "stage name must not be empty");
        self.stage = stage;
        self
    }

    /// Select the flip-vector operand pairing.
    pub fn with_flip_pairing(mut self, pairing: FlipPairing) -> Self {
        self.flip_pairing = pairing;
        self
    }

    /// Enable or disable parallel generation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the cycle count below which generation stays sequential.
    pub fn with_min_parallel_cycles(mut self, cycles: usize) -> Self {
        self.min_parallel_cycles = cycles;
        self
    }

    /// Whether an execution of `cycle_count` cycles should use the parallel path.
    pub fn use_parallel(&self, cycle_count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && cycle_count >= self.min_parallel_cycles
    }
}
