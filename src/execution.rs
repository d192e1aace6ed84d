//! Read-only access to a simulated pipeline execution.
//!
//! The models never drive a simulator themselves. They consume a fully
//! materialized execution through the [`Execution`] trait, which answers
//! four questions per cycle: how many cycles exist, whether a stage holds a
//! real instruction, which instruction that is, and what an operand resolves
//! to.
//!
//! [`RecordedExecution`] is an in-memory implementation that can be built
//! programmatically or loaded from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LeakageError, Result};

/// An instruction operand as it appears in the program text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// A register whose value is looked up in the cycle's register state.
    Register(String),
    /// A literal value.
    Immediate(u32),
}

impl Operand {
    /// Shorthand for a register operand.
    pub fn reg(name: impl Into<String>) -> Self {
        Self::Register(name.into())
    }

    /// Shorthand for an immediate operand.
    pub fn imm(value: u32) -> Self {
        Self::Immediate(value)
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Register(name) => write!(f, "{}", name),
            Operand::Immediate(value) => write!(f, "#{}", value),
        }
    }
}

/// An instruction snapshot: opcode and operand descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// Opcode mnemonic, used as the coefficient lookup key.
    pub opcode: String,
    /// Operands in program order.
    #[serde(default)]
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Create an instruction.
    pub fn new(opcode: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            opcode: opcode.into(),
            operands,
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}

/// Read-only view over a per-cycle pipeline state.
///
/// Implementations must be fully materialized: every method is a lookup,
/// never a simulation step, so models may call them from several threads.
pub trait Execution: Sync {
    /// Number of clock cycles in the execution.
    fn cycle_count(&self) -> usize;

    /// Whether `stage` holds a real instruction at `cycle`.
    ///
    /// Returns `Ok(false)` for stalls and flushes. A stage the pipeline does
    /// not have at that cycle is an error, not a stall.
    fn is_normal_state(&self, cycle: usize, stage: &str) -> Result<bool>;

    /// The instruction occupying `stage` at `cycle`.
    fn instruction_at(&self, cycle: usize, stage: &str) -> Result<&Instruction>;

    /// Resolve operand `index` (0-based) of `instruction` against the state at `cycle`.
    fn operand_value(&self, cycle: usize, instruction: &Instruction, index: usize) -> Result<u32>;
}

/// What a pipeline stage holds during one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageSlot {
    /// A real instruction.
    Occupied(Instruction),
    /// A bubble inserted by a stall.
    Stalled,
    /// An instruction squashed by a flush.
    Flushed,
}

impl StageSlot {
    /// Whether the slot holds a real instruction.
    pub fn is_normal(&self) -> bool {
        matches!(self, StageSlot::Occupied(_))
    }
}

/// Pipeline and register state for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    /// Register values visible to instructions in this cycle.
    #[serde(default)]
    pub registers: BTreeMap<String, u32>,
    /// Contents of each pipeline stage.
    #[serde(default)]
    pub stages: BTreeMap<String, StageSlot>,
}

impl CycleState {
    /// Create an empty cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `instruction` in `stage`.
    pub fn with_instruction(mut self, stage: impl Into<String>, instruction: Instruction) -> Self {
        self.stages
            .insert(stage.into(), StageSlot::Occupied(instruction));
        self
    }

    /// Mark `stage` as stalled.
    pub fn with_stall(mut self, stage: impl Into<String>) -> Self {
        self.stages.insert(stage.into(), StageSlot::Stalled);
        self
    }

    /// Mark `stage` as flushed.
    pub fn with_flush(mut self, stage: impl Into<String>) -> Self {
        self.stages.insert(stage.into(), StageSlot::Flushed);
        self
    }

    /// Set a register value.
    pub fn with_register(mut self, name: impl Into<String>, value: u32) -> Self {
        self.registers.insert(name.into(), value);
        self
    }
}

/// A materialized execution held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedExecution {
    /// One entry per clock cycle, in cycle order.
    pub cycles: Vec<CycleState>,
}

impl RecordedExecution {
    /// Create an execution from cycle states.
    pub fn new(cycles: Vec<CycleState>) -> Self {
        Self { cycles }
    }

    /// Parse an execution from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(LeakageError::Execution)
    }

    /// Append a cycle.
    pub fn push(&mut self, cycle: CycleState) {
        self.cycles.push(cycle);
    }

    fn cycle(&self, cycle: usize) -> Result<&CycleState> {
        self.cycles.get(cycle).ok_or(LeakageError::CycleOutOfRange {
            cycle,
            cycle_count: self.cycles.len(),
        })
    }
}

impl Execution for RecordedExecution {
    fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    fn is_normal_state(&self, cycle: usize, stage: &str) -> Result<bool> {
        self.cycle(cycle)?
            .stages
            .get(stage)
            .map(StageSlot::is_normal)
            .ok_or_else(|| LeakageError::UnknownStage {
                cycle,
                stage: stage.to_string(),
            })
    }

    fn instruction_at(&self, cycle: usize, stage: &str) -> Result<&Instruction> {
        match self.cycle(cycle)?.stages.get(stage) {
            Some(StageSlot::Occupied(instruction)) => Ok(instruction),
            Some(_) => Err(LeakageError::EmptyStage {
                cycle,
                stage: stage.to_string(),
            }),
            None => Err(LeakageError::UnknownStage {
                cycle,
                stage: stage.to_string(),
            }),
        }
    }

    fn operand_value(&self, cycle: usize, instruction: &Instruction, index: usize) -> Result<u32> {
        let state = self.cycle(cycle)?;
        let operand = instruction
            .operands
            .get(index)
            .ok_or_else(|| LeakageError::MissingOperand {
                cycle,
                opcode: instruction.opcode.clone(),
                index,
            })?;

        match operand {
            Operand::Immediate(value) => Ok(*value),
            Operand::Register(name) => {
                state
                    .registers
                    .get(name)
                    .copied()
                    .ok_or_else(|| LeakageError::UnknownRegister {
                        cycle,
                        register: name.clone(),
                    })
            }
        }
    }
}
