use leakage_sim::{
    registry, CoefficientTable, Coefficients, Config, Execution, HammingWeightModel, LeakageError,
    Model, ModelRegistry, RecordedExecution, Result,
};

use crate::common::alu;

/// A model defined outside the crate: leaks the constant 1 per normal cycle.
struct Activity<'a> {
    execution: &'a dyn Execution,
}

impl Model for Activity<'_> {
    fn name(&self) -> &'static str {
        "Activity"
    }

    fn generate_traces(&self) -> Result<Vec<f64>> {
        (0..self.execution.cycle_count())
            .map(|cycle| -> Result<f64> {
                let normal = self.execution.is_normal_state(cycle, "Execute")?;
                Ok(if normal { 1.0 } else { 0.0 })
            })
            .collect()
    }

    fn interaction_terms(&self) -> &'static [&'static str] {
        &[]
    }
}

fn activity<'a>(
    execution: &'a dyn Execution,
    _coefficients: &'a dyn Coefficients,
    _config: &Config,
) -> Result<Box<dyn Model + 'a>> {
    Ok(Box::new(Activity { execution }))
}

fn hamming<'a>(
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

#[test]
fn external_models_register_alongside_builtins() {
    let mut models = ModelRegistry::with_builtin_models().unwrap();
    models.register("Activity", activity).unwrap();
    assert_eq!(models.names(), vec!["Activity", "HammingWeight", "Power"]);

    let exec = RecordedExecution::new(vec![alu("add", 1, 1), crate::common::stall()]);
    let table = CoefficientTable::new();
    let model = models.create("Activity", &exec, &table).unwrap();
    assert_eq!(model.generate_traces().unwrap(), vec![1.0, 0.0]);
}

#[test]
fn builtin_name_collision_is_rejected() {
    let mut models = ModelRegistry::with_builtin_models().unwrap();
    let err = models.register("HammingWeight", hamming).unwrap_err();
    assert!(matches!(err, LeakageError::DuplicateModel { name: "HammingWeight" }));
}

#[test]
fn global_registry_is_ready_from_many_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| registry().names()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec!["HammingWeight", "Power"]);
    }
}

#[test]
fn models_are_discarded_independently() {
    let exec = RecordedExecution::new(vec![alu("add", 7, 0)]);
    let table = CoefficientTable::new();
    let first = registry().create("HammingWeight", &exec, &table).unwrap();
    let trace = first.generate_traces().unwrap();
    drop(first);

    let second = registry().create("HammingWeight", &exec, &table).unwrap();
    assert_eq!(second.generate_traces().unwrap(), trace);
}
