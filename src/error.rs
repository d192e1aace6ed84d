//! Error types for leakage model construction and trace generation.
//!
//! Errors fall into two fatal families:
//!
//! - **Configuration** errors are raised while a model is being constructed
//!   (or while its collaborators are being loaded). No samples are produced.
//! - **Trace corruption** errors are raised when the execution accessor cannot
//!   answer a query about a cycle it claims to contain. Generation aborts
//!   instead of emitting partial output.
//!
//! A stalled or flushed pipeline stage is not an error; models emit a zero
//! sample for that cycle.

/// Error returned by model construction, lookup, and trace generation.
#[derive(Debug, thiserror::Error)]
pub enum LeakageError {
    /// The coefficient source cannot supply every required interaction term.
    #[error(
        "model `{model}` was not provided with the interaction terms it needs: {}",
        format_pairs(.missing)
    )]
    MissingInteractionTerms {
        /// Name of the model being constructed.
        model: &'static str,
        /// Every `(opcode, term)` pair that had no coefficient vector.
        missing: Vec<(String, String)>,
    },

    /// A coefficient vector does not have one weight per bit position.
    #[error("coefficients for ({opcode}, {term}) have {found} entries, expected {expected}")]
    CoefficientWidth {
        /// Opcode the vector belongs to.
        opcode: String,
        /// Interaction term the vector belongs to.
        term: String,
        /// Required vector length.
        expected: usize,
        /// Actual vector length.
        found: usize,
    },

    /// No model is registered under the requested name.
    #[error("unknown model `{name}` (available: {})", .available.join(", "))]
    UnknownModel {
        /// Requested model name.
        name: String,
        /// Names of all registered models.
        available: Vec<&'static str>,
    },

    /// Two models tried to register under the same name.
    #[error("a model named `{name}` is already registered")]
    DuplicateModel {
        /// The colliding name.
        name: &'static str,
    },

    /// A coefficient document could not be parsed.
    #[error("malformed coefficient document: {0}")]
    Coefficients(#[source] serde_json::Error),

    /// A cycle index beyond the end of the execution was queried.
    #[error("cycle {cycle} is out of range (execution has {cycle_count} cycles)")]
    CycleOutOfRange {
        /// Requested cycle.
        cycle: usize,
        /// Number of cycles in the execution.
        cycle_count: usize,
    },

    /// The requested pipeline stage does not exist at this cycle.
    #[error("cycle {cycle} has no pipeline stage named `{stage}`")]
    UnknownStage {
        /// Cycle being queried.
        cycle: usize,
        /// Stage name being queried.
        stage: String,
    },

    /// The stage exists but holds a stall or flush rather than an instruction.
    #[error("stage `{stage}` holds no instruction at cycle {cycle}")]
    EmptyStage {
        /// Cycle being queried.
        cycle: usize,
        /// Stage name being queried.
        stage: String,
    },

    /// The instruction has fewer operands than the model needs.
    #[error("instruction `{opcode}` at cycle {cycle} has no operand {index}")]
    MissingOperand {
        /// Cycle being queried.
        cycle: usize,
        /// Opcode of the instruction.
        opcode: String,
        /// 0-based operand index.
        index: usize,
    },

    /// An operand names a register the recorded state does not contain.
    #[error("register `{register}` cannot be resolved at cycle {cycle}")]
    UnknownRegister {
        /// Cycle being queried.
        cycle: usize,
        /// Register name.
        register: String,
    },

    /// A recorded execution document could not be parsed.
    #[error("malformed execution document: {0}")]
    Execution(#[source] serde_json::Error),
}

impl LeakageError {
    /// Whether this error comes from a misconfigured model or coefficient source.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingInteractionTerms { .. }
                | Self::CoefficientWidth { .. }
                | Self::UnknownModel { .. }
                | Self::DuplicateModel { .. }
                | Self::Coefficients(_)
        )
    }

    /// Whether this error comes from a malformed execution trace.
    pub fn is_trace_corruption(&self) -> bool {
        !self.is_configuration()
    }
}

fn format_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(opcode, term)| format!("({opcode}, {term})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias used throughout the crate.
pub type Result<T, E = LeakageError> = std::result::Result<T, E>;
