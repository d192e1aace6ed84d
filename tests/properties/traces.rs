use leakage_sim::{
    registry, CoefficientTable, Config, CycleState, Execution, Instruction, Operand,
    RecordedExecution, COEFFICIENT_WIDTH, EXECUTE_STAGE, POWER_INTERACTION_TERMS,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const OPCODES: [&str; 4] = ["add", "eor", "lsl", "ldr"];

/// A random execution where roughly one cycle in five is stalled or flushed.
fn random_execution(rng: &mut Xoshiro256PlusPlus, cycles: usize) -> RecordedExecution {
    let mut exec = RecordedExecution::default();
    for _ in 0..cycles {
        let state = match rng.random_range(0..10) {
            0 => CycleState::new().with_stall(EXECUTE_STAGE),
            1 => CycleState::new().with_flush(EXECUTE_STAGE),
            _ => {
                let opcode = OPCODES[rng.random_range(0..OPCODES.len())];
                let operands = vec![Operand::reg("r0"), Operand::imm(rng.random())];
                CycleState::new()
                    .with_register("r0", rng.random())
                    .with_instruction(EXECUTE_STAGE, Instruction::new(opcode, operands))
                    .with_instruction("Decode", Instruction::new("nop", vec![]))
            }
        };
        exec.push(state);
    }
    exec
}

fn random_table(rng: &mut Xoshiro256PlusPlus) -> CoefficientTable {
    let mut table = CoefficientTable::new();
    for opcode in OPCODES {
        for term in POWER_INTERACTION_TERMS {
            let weights = (0..COEFFICIENT_WIDTH).map(|_| rng.random::<f64>()).collect();
            table.insert(opcode, *term, weights).unwrap();
        }
    }
    table
}

#[test]
fn every_model_emits_one_sample_per_cycle() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
    let table = random_table(&mut rng);
    for cycles in [0, 1, 2, 17, 300] {
        let exec = random_execution(&mut rng, cycles);
        for name in registry().names() {
            let model = registry().create(name, &exec, &table).unwrap();
            assert_eq!(model.generate_traces().unwrap().len(), exec.cycle_count(), "{name}");
        }
    }
}

#[test]
fn abnormal_cycles_are_zero_for_every_model() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(99);
    let table = random_table(&mut rng);
    let exec = random_execution(&mut rng, 500);

    for name in registry().names() {
        let trace = registry().create(name, &exec, &table).unwrap().generate_traces().unwrap();
        for (cycle, sample) in trace.iter().enumerate() {
            if !exec.is_normal_state(cycle, EXECUTE_STAGE).unwrap() {
                assert_eq!(*sample, 0.0, "{name} cycle {cycle}");
            }
        }
    }
}

#[test]
fn hamming_weight_matches_count_ones() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let exec = random_execution(&mut rng, 400);
    let table = CoefficientTable::new();
    let trace = registry()
        .create("HammingWeight", &exec, &table)
        .unwrap()
        .generate_traces()
        .unwrap();

    for (cycle, sample) in trace.iter().enumerate() {
        let normal = exec.is_normal_state(cycle, EXECUTE_STAGE).unwrap();
        let expected = match exec.cycles[cycle].registers.get("r0") {
            Some(value) if normal => value.count_ones(),
            _ => 0,
        };
        assert_eq!(*sample, f64::from(expected));
    }
}

#[test]
fn generation_is_idempotent() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(31337);
    let table = random_table(&mut rng);
    let exec = random_execution(&mut rng, 1000);

    for name in registry().names() {
        let model = registry().create(name, &exec, &table).unwrap();
        assert_eq!(model.generate_traces().unwrap(), model.generate_traces().unwrap());
    }
}

#[test]
fn parallel_and_sequential_traces_are_identical() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
    let table = random_table(&mut rng);
    let exec = random_execution(&mut rng, 5000);
    let sequential = Config::new().with_parallel(false);
    let parallel = Config::new().with_min_parallel_cycles(1);

    for name in registry().names() {
        let a = registry()
            .create_with_config(name, &exec, &table, &sequential)
            .unwrap()
            .generate_traces()
            .unwrap();
        let b = registry()
            .create_with_config(name, &exec, &table, &parallel)
            .unwrap()
            .generate_traces()
            .unwrap();
        assert_eq!(a, b, "{name}");
    }
}
