//! Per-opcode coefficient vectors that weight model features.
//!
//! Coefficients are calibrated outside this crate. Models only read them:
//! each `(opcode, interaction term)` pair maps to [`COEFFICIENT_WIDTH`]
//! weights, one per bit position of a 32-bit operand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LeakageError, Result};

/// Number of weights in every coefficient vector.
pub const COEFFICIENT_WIDTH: usize = 32;

/// Source of coefficient vectors keyed by opcode and interaction term.
pub trait Coefficients: Sync {
    /// The weights for `term` when `opcode` executes, if configured.
    fn coefficients_for(&self, opcode: &str, term: &str) -> Option<&[f64]>;
}

/// In-memory coefficient table.
///
/// Serializes as `{ "opcode": { "term": [w0, w1, ...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientTable {
    table: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

impl CoefficientTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from JSON, rejecting vectors of the wrong width.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json).map_err(LeakageError::Coefficients)?;
        table.validate_width()?;
        Ok(table)
    }

    /// Set the vector for `(opcode, term)`, replacing any previous one.
    pub fn insert(
        &mut self,
        opcode: impl Into<String>,
        term: impl Into<String>,
        weights: Vec<f64>,
    ) -> Result<()> {
        let (opcode, term) = (opcode.into(), term.into());
        if weights.len() != COEFFICIENT_WIDTH {
            return Err(LeakageError::CoefficientWidth {
                opcode,
                term,
                expected: COEFFICIENT_WIDTH,
                found: weights.len(),
            });
        }
        self.table.entry(opcode).or_default().insert(term, weights);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(
        mut self,
        opcode: impl Into<String>,
        term: impl Into<String>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        self.insert(opcode, term, weights)?;
        Ok(self)
    }

    /// Every opcode with at least one term, sorted.
    pub fn opcodes(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }

    /// Number of `(opcode, term)` entries.
    pub fn len(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate_width(&self) -> Result<()> {
        for (opcode, terms) in &self.table {
            for (term, weights) in terms {
                if weights.len() != COEFFICIENT_WIDTH {
                    return Err(LeakageError::CoefficientWidth {
                        opcode: opcode.clone(),
                        term: term.clone(),
                        expected: COEFFICIENT_WIDTH,
                        found: weights.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Coefficients for CoefficientTable {
    fn coefficients_for(&self, opcode: &str, term: &str) -> Option<&[f64]> {
        self.table
            .get(opcode)
            .and_then(|terms| terms.get(term))
            .map(Vec::as_slice)
    }
}
