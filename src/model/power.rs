//! Multi-term power model.
//!
//! Each cycle's sample combines four second-order features of the
//! instruction at the configured stage:
//!
//! - bit interactions within operand 1 and within operand 2 (static leakage)
//! - bit interactions within two flip vectors between this instruction and
//!   the one before it (switching leakage)
//!
//! Every feature is weighted by the `(opcode, term)` coefficient vector and
//! the weighted terms are summed.
//!
//! Generation runs in two passes. The first builds an [`InstructionRecord`]
//! per cycle, independently. The second pairs each record with its
//! predecessor to derive the flip features and emit the sample. Both passes
//! are parallel across cycles.

use super::registry::ModelRegistry;
use super::{check_interaction_terms, map_cycles, Model};
use crate::coefficients::Coefficients;
use crate::config::{Config, FlipPairing};
use crate::error::{LeakageError, Result};
use crate::execution::{Execution, Instruction};
use crate::interactions::{bitflip, popcount_pairs, weighted_term};

/// Bit interactions within the first operand.
pub const TERM_OPERAND_1_INTERACTIONS: &str = "Operand1_Interactions";
/// Bit interactions within the second operand.
pub const TERM_OPERAND_2_INTERACTIONS: &str = "Operand2_Interactions";
/// Bit interactions within the first flip vector.
pub const TERM_BIT_FLIP_1_INTERACTIONS: &str = "BitFlip1_Interactions";
/// Bit interactions within the second flip vector.
pub const TERM_BIT_FLIP_2_INTERACTIONS: &str = "BitFlip2_Interactions";

/// Every term the Power model weights, in summation order.
pub const POWER_INTERACTION_TERMS: &[&str] = &[
    TERM_OPERAND_1_INTERACTIONS,
    TERM_OPERAND_2_INTERACTIONS,
    TERM_BIT_FLIP_1_INTERACTIONS,
    TERM_BIT_FLIP_2_INTERACTIONS,
];

/// Per-cycle features that depend only on the cycle's own instruction.
///
/// Stalls and flushes produce a record with no instruction and zero
/// operands, which still serves as the predecessor of the next cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InstructionRecord<'a> {
    instruction: Option<&'a Instruction>,
    operand_1: u32,
    operand_2: u32,
    operand_1_interactions: u32,
    operand_2_interactions: u32,
}

impl<'a> InstructionRecord<'a> {
    fn new(instruction: &'a Instruction, operand_1: u32, operand_2: u32) -> Self {
        Self {
            instruction: Some(instruction),
            operand_1,
            operand_2,
            operand_1_interactions: popcount_pairs(operand_1),
            operand_2_interactions: popcount_pairs(operand_2),
        }
    }
}

/// Features relating an instruction to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FlipRecord {
    operand_1_flip: u32,
    operand_2_flip: u32,
    flip_1_interactions: u32,
    flip_2_interactions: u32,
}

impl FlipRecord {
    fn between(
        current: &InstructionRecord<'_>,
        previous: &InstructionRecord<'_>,
        pairing: FlipPairing,
    ) -> Self {
        let operand_1_flip = bitflip(current.operand_1, previous.operand_2);
        let operand_2_flip = match pairing {
            FlipPairing::Symmetric => bitflip(current.operand_2, previous.operand_2),
            FlipPairing::Duplicated => operand_1_flip,
        };
        Self {
            operand_1_flip,
            operand_2_flip,
            flip_1_interactions: popcount_pairs(operand_1_flip),
            flip_2_interactions: popcount_pairs(operand_2_flip),
        }
    }
}

fn feature(term: &str, record: &InstructionRecord<'_>, flips: &FlipRecord) -> Option<u32> {
    match term {
        TERM_OPERAND_1_INTERACTIONS => Some(record.operand_1_interactions),
        TERM_OPERAND_2_INTERACTIONS => Some(record.operand_2_interactions),
        TERM_BIT_FLIP_1_INTERACTIONS => Some(flips.flip_1_interactions),
        TERM_BIT_FLIP_2_INTERACTIONS => Some(flips.flip_2_interactions),
        _ => None,
    }
}

/// Power model combining operand and cross-cycle bit interactions.
pub struct PowerModel<'a> {
    execution: &'a dyn Execution,
    coefficients: &'a dyn Coefficients,
    config: Config,
}

impl<'a> PowerModel<'a> {
    /// Registry name.
    pub const NAME: &'static str = "Power";

    /// Build the model with default settings.
    ///
    /// Fails with a configuration error if any opcode that reaches the
    /// Execute stage lacks a coefficient vector for one of
    /// [`POWER_INTERACTION_TERMS`].
    pub fn new(execution: &'a dyn Execution, coefficients: &'a dyn Coefficients) -> Result<Self> {
        Self::with_config(execution, coefficients, &Config::default())
    }

    /// Build the model with explicit settings.
    pub fn with_config(
        execution: &'a dyn Execution,
        coefficients: &'a dyn Coefficients,
        config: &Config,
    ) -> Result<Self> {
        check_interaction_terms(
            Self::NAME,
            POWER_INTERACTION_TERMS,
            execution,
            coefficients,
            config,
        )?;
        tracing::debug!(
            model = Self::NAME,
            flip_pairing = %config.flip_pairing,
            "interaction terms validated"
        );
        Ok(Self {
            execution,
            coefficients,
            config: config.clone(),
        })
    }

    fn record(&self, cycle: usize) -> Result<InstructionRecord<'a>> {
        let stage = self.config.stage.as_str();
        if !self.execution.is_normal_state(cycle, stage)? {
            return Ok(InstructionRecord::default());
        }
        let instruction = self.execution.instruction_at(cycle, stage)?;
        Ok(InstructionRecord::new(
            instruction,
            self.execution.operand_value(cycle, instruction, 0)?,
            self.execution.operand_value(cycle, instruction, 1)?,
        ))
    }

    fn sample(
        &self,
        record: &InstructionRecord<'_>,
        previous: &InstructionRecord<'_>,
    ) -> Result<f64> {
        let Some(instruction) = record.instruction else {
            return Ok(0.0);
        };
        let flips = FlipRecord::between(record, previous, self.config.flip_pairing);

        let mut total = 0.0;
        for term in POWER_INTERACTION_TERMS {
            let missing = || LeakageError::MissingInteractionTerms {
                model: Self::NAME,
                missing: vec![(instruction.opcode.clone(), term.to_string())],
            };
            let weights = self
                .coefficients
                .coefficients_for(&instruction.opcode, term)
                .ok_or_else(missing)?;
            let value = feature(term, record, &flips).ok_or_else(missing)?;
            total += weighted_term(weights, f64::from(value));
        }
        Ok(total)
    }
}

impl Model for PowerModel<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate_traces(&self) -> Result<Vec<f64>> {
        let cycles = self.execution.cycle_count();
        let records = map_cycles(cycles, &self.config, |cycle| self.record(cycle))?;

        // Cycle 0 follows a pipeline reset: an all-zero predecessor.
        let reset = InstructionRecord::default();
        let trace = map_cycles(cycles, &self.config, |cycle| {
            let previous = if cycle == 0 { &reset } else { &records[cycle - 1] };
            self.sample(&records[cycle], previous)
        })?;

        tracing::info!(model = Self::NAME, cycles, "generated leakage trace");
        Ok(trace)
    }

    fn interaction_terms(&self) -> &'static [&'static str] {
        POWER_INTERACTION_TERMS
    }
}

fn construct<'a>(
    execution: &'a dyn Execution,
    coefficients: &'a dyn Coefficients,
    config: &Config,
) -> Result<Box<dyn Model + 'a>> {
    Ok(Box::new(PowerModel::with_config(execution, coefficients, config)?))
}

pub(crate) fn register(registry: &mut ModelRegistry) -> Result<()> {
    registry.register(PowerModel::NAME, construct)
}
