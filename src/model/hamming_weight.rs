//! Hamming weight of the first operand.
//!
//! The simplest useful model: each cycle leaks the number of set bits in the
//! first operand of the instruction at the configured stage. It needs no
//! coefficients and serves as the template for new models.

use super::registry::ModelRegistry;
use super::{check_interaction_terms, map_cycles, Model};
use crate::coefficients::Coefficients;
use crate::config::Config;
use crate::error::Result;
use crate::execution::Execution;
use crate::interactions::hamming_weight;

/// Single-operand Hamming weight model.
pub struct HammingWeightModel<'a> {
    execution: &'a dyn Execution,
    config: Config,
}

impl<'a> HammingWeightModel<'a> {
    /// Registry name.
    pub const NAME: &'static str = "HammingWeight";

    const INTERACTION_TERMS: &'static [&'static str] = &[];

    /// Build the model with default settings.
    pub fn new(execution: &'a dyn Execution, coefficients: &'a dyn Coefficients) -> Result<Self> {
        Self::with_config(execution, coefficients, &Config::default())
    }

    /// Build the model, reading `config.stage`.
    pub fn with_config(
        execution: &'a dyn Execution,
        coefficients: &'a dyn Coefficients,
        config: &Config,
    ) -> Result<Self> {
        check_interaction_terms(
            Self::NAME,
            Self::INTERACTION_TERMS,
            execution,
            coefficients,
            config,
        )?;
        Ok(Self {
            execution,
            config: config.clone(),
        })
    }

    fn sample(&self, cycle: usize) -> Result<f64> {
        let stage = self.config.stage.as_str();
        if !self.execution.is_normal_state(cycle, stage)? {
            return Ok(0.0);
        }
        let instruction = self.execution.instruction_at(cycle, stage)?;
        let value = self.execution.operand_value(cycle, instruction, 0)?;
        Ok(f64::from(hamming_weight(value)))
    }
}

impl Model for HammingWeightModel<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate_traces(&self) -> Result<Vec<f64>> {
        let cycles = self.execution.cycle_count();
        let trace = map_cycles(cycles, &self.config, |cycle| self.sample(cycle))?;
        tracing::info!(model = Self::NAME, cycles, "generated leakage trace");
        Ok(trace)
    }

    fn interaction_terms(&self) -> &'static [&'static str] {
        Self::INTERACTION_TERMS
    }
}

fn construct<'a>(
    execution: &'a dyn Execution,
    coefficients: &'a dyn Coefficients,
    config: &Config,
) -> Result<Box<dyn Model + 'a>> {
    Ok(Box::new(HammingWeightModel::with_config(
        execution,
        coefficients,
        config,
    )?))
}

pub(crate) fn register(registry: &mut ModelRegistry) -> Result<()> {
    registry.register(HammingWeightModel::NAME, construct)
}
