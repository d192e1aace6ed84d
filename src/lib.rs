//! # leakage-sim
//!
//! Synthetic power/EM side-channel traces from simulated pipeline execution.
//!
//! Given a per-cycle record of what each pipeline stage held (an
//! [`Execution`]) and a table of calibrated weights ([`Coefficients`]), a
//! leakage [`Model`] emits one sample per clock cycle approximating the
//! device's power draw. The resulting traces can be fed to the same
//! statistical tooling used on oscilloscope captures, without needing the
//! hardware.
//!
//! ## Models
//!
//! - **HammingWeight**: number of set bits in the first operand. Needs no
//!   coefficients.
//! - **Power**: coefficient-weighted sum of second-order bit interactions
//!   within each operand and within the bit flips between consecutive
//!   instructions.
//!
//! Models are looked up by name through the process-wide [`registry`].
//! Construction checks that the coefficients cover every opcode/term pair
//! the model will need, so a misconfigured table fails before any sample is
//! computed.
//!
//! ## Quick Start
//!
//! ```
//! use leakage_sim::{
//!     registry, CoefficientTable, CycleState, Instruction, Operand, RecordedExecution,
//!     EXECUTE_STAGE,
//! };
//!
//! let mov = |value| {
//!     CycleState::new()
//!         .with_register("r0", value)
//!         .with_instruction(EXECUTE_STAGE, Instruction::new("mov", vec![Operand::reg("r0")]))
//! };
//! let execution = RecordedExecution::new(vec![
//!     CycleState::new().with_stall(EXECUTE_STAGE),
//!     mov(0b0110),
//!     mov(0b1111),
//! ]);
//! let coefficients = CoefficientTable::new();
//!
//! let model = registry().create("HammingWeight", &execution, &coefficients)?;
//! assert_eq!(model.generate_traces()?, vec![0.0, 2.0, 4.0]);
//! # Ok::<(), leakage_sim::LeakageError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod coefficients;
mod config;
mod error;
mod execution;

// Functional modules
pub mod interactions;
pub mod model;

// Re-exports for public API
pub use coefficients::{CoefficientTable, Coefficients, COEFFICIENT_WIDTH};
pub use config::{Config, FlipPairing, EXECUTE_STAGE};
pub use error::{LeakageError, Result};
pub use execution::{CycleState, Execution, Instruction, Operand, RecordedExecution, StageSlot};
pub use model::{
    check_interaction_terms, registry, HammingWeightModel, Model, ModelConstructor,
    ModelRegistry, PowerModel, POWER_INTERACTION_TERMS,
};
