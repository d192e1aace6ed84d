//! Shared fixtures for model tests.

use leakage_sim::{
    CoefficientTable, CycleState, Instruction, Operand, COEFFICIENT_WIDTH, EXECUTE_STAGE,
    POWER_INTERACTION_TERMS,
};

/// A cycle executing `opcode r0, r1` with the given register values.
pub fn alu(opcode: &str, r0: u32, r1: u32) -> CycleState {
    CycleState::new()
        .with_register("r0", r0)
        .with_register("r1", r1)
        .with_instruction(
            EXECUTE_STAGE,
            Instruction::new(opcode, vec![Operand::reg("r0"), Operand::reg("r1")]),
        )
}

/// A cycle whose Execute stage holds a stall bubble.
pub fn stall() -> CycleState {
    CycleState::new().with_stall(EXECUTE_STAGE)
}

/// A cycle whose Execute stage was flushed.
pub fn flush() -> CycleState {
    CycleState::new().with_flush(EXECUTE_STAGE)
}

/// Coefficients with every Power term set to `weight` per bit for each opcode.
pub fn uniform_power_table(opcodes: &[&str], weight: f64) -> CoefficientTable {
    let mut table = CoefficientTable::new();
    for opcode in opcodes {
        for term in POWER_INTERACTION_TERMS {
            table
                .insert(*opcode, *term, vec![weight; COEFFICIENT_WIDTH])
                .expect("uniform vectors have the right width");
        }
    }
    table
}
