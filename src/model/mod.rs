//! Leakage models and the registry that selects them by name.
//!
//! A model borrows an [`Execution`] and a [`Coefficients`] source for its
//! whole lifetime. Construction validates that the coefficients can weight
//! every interaction term the model uses; [`Model::generate_traces`] then
//! emits one sample per cycle.
//!
//! New models live in their own module and add a constructor to the
//! registry from a `register` function; nothing else needs to change.

mod hamming_weight;
mod power;
mod registry;

pub use hamming_weight::HammingWeightModel;
pub use power::{
    PowerModel, POWER_INTERACTION_TERMS, TERM_BIT_FLIP_1_INTERACTIONS,
    TERM_BIT_FLIP_2_INTERACTIONS, TERM_OPERAND_1_INTERACTIONS, TERM_OPERAND_2_INTERACTIONS,
};
pub use registry::{registry, ModelConstructor, ModelRegistry};

use std::collections::BTreeSet;

use crate::coefficients::{Coefficients, COEFFICIENT_WIDTH};
use crate::config::Config;
use crate::error::{LeakageError, Result};
use crate::execution::Execution;

/// A mathematical model turning an execution into a leakage trace.
pub trait Model: Send + Sync {
    /// Name the model is registered under.
    fn name(&self) -> &'static str;

    /// Produce one sample per cycle, in cycle order.
    ///
    /// Deterministic for fixed inputs; calling it twice yields identical
    /// traces. Cycles whose stage is stalled or flushed yield `0.0`.
    fn generate_traces(&self) -> Result<Vec<f64>>;

    /// Interaction terms the coefficient source must supply for this model.
    fn interaction_terms(&self) -> &'static [&'static str];
}

/// Check that `coefficients` can weight every `terms` entry for every opcode
/// that reaches `config.stage` during `execution`.
///
/// All missing pairs are collected into one error. Models with no terms
/// skip the scan, but still fail if the first cycle lacks `config.stage`.
pub fn check_interaction_terms(
    model: &'static str,
    terms: &[&str],
    execution: &dyn Execution,
    coefficients: &dyn Coefficients,
    config: &Config,
) -> Result<()> {
    if terms.is_empty() {
        if execution.cycle_count() > 0 {
            execution.is_normal_state(0, &config.stage)?;
        }
        return Ok(());
    }

    let mut opcodes = BTreeSet::new();
    for cycle in 0..execution.cycle_count() {
        if execution.is_normal_state(cycle, &config.stage)? {
            opcodes.insert(execution.instruction_at(cycle, &config.stage)?.opcode.as_str());
        }
    }
    tracing::debug!(
        model,
        opcodes = opcodes.len(),
        terms = terms.len(),
        "validating interaction terms"
    );

    let mut missing = Vec::new();
    for opcode in &opcodes {
        for term in terms {
            match coefficients.coefficients_for(opcode, term) {
                None => missing.push((opcode.to_string(), term.to_string())),
                Some(weights) if weights.len() != COEFFICIENT_WIDTH => {
                    return Err(LeakageError::CoefficientWidth {
                        opcode: opcode.to_string(),
                        term: term.to_string(),
                        expected: COEFFICIENT_WIDTH,
                        found: weights.len(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LeakageError::MissingInteractionTerms { model, missing })
    }
}

/// Evaluate `f` for every cycle, in parallel when the config allows it.
///
/// Any per-cycle error aborts the whole map.
pub(crate) fn map_cycles<T, F>(cycle_count: usize, config: &Config, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if config.use_parallel(cycle_count) {
            use rayon::prelude::*;
            return (0..cycle_count).into_par_iter().map(f).collect();
        }
    }

    #[cfg(not(feature = "parallel"))]
    let _ = config;

    (0..cycle_count).map(f).collect()
}
