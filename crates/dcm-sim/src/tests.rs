//! Integration tests for dcm-sim.

use std::sync::Arc;

use dcm_core::{CoefficientSet, Purpose, UnitId, WorkerId};
use dcm_logit::{
    CalcMode, CalculatorFactory, Choice, ChoiceCalculator, LogitError, ModelSpec, Observation,
    Validation,
};
use dcm_model::{ChoiceModel, DecisionUnit};

use crate::{
    NoopObserver, PassObserver, PassRunner, PassSummary, RunConfig, RunMode, SimError,
    WorkerContext,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SEED: u64 = 42;
const SIZE_ALT1: usize = 1;
const SIZE_ALT2: usize = 2;

fn coefficients() -> Arc<CoefficientSet> {
    Arc::new(
        CoefficientSet::from_entries(
            10,
            [(SIZE_ALT1, "size_alt1", 0.3), (SIZE_ALT2, "size_alt2", -0.2)],
        )
        .unwrap(),
    )
}

#[derive(Clone)]
struct Household {
    id:       UnitId,
    size:     f64,
    observed: Option<usize>,
    vehicles: Option<usize>,
}

impl DecisionUnit for Household {
    fn id(&self) -> UnitId {
        self.id
    }
}

/// Households with ids 1..=n.  Every fourth has no surveyed choice.
fn households(n: usize) -> Vec<Household> {
    (0..n)
        .map(|i| Household {
            id:       UnitId(i as u64 + 1),
            size:     1.0 + (i % 4) as f64,
            observed: if i % 4 == 0 { None } else { Some(i % 3) },
            vehicles: None,
        })
        .collect()
}

/// Flat three-alternative vehicle-count model over household size.
struct VehicleModel {
    factory: CalculatorFactory,
}

impl VehicleModel {
    fn new() -> Self {
        let spec = ModelSpec {
            name:               "vehicles".to_owned(),
            total_alternatives: 3,
            total_nests:        0,
            levels:             1,
            max_parameter:      10,
        };
        Self { factory: CalculatorFactory::new(spec, coefficients()).unwrap() }
    }
}

impl ChoiceModel for VehicleModel {
    type Unit = Household;

    fn name(&self) -> &str {
        "vehicles"
    }

    fn purpose(&self) -> Purpose {
        Purpose(7)
    }

    fn factory(&self) -> &CalculatorFactory {
        &self.factory
    }

    fn build(&self, unit: &Household, calculator: &mut ChoiceCalculator) {
        for index in 0..3 {
            let mut alternative =
                calculator.alternative(index, true, unit.observed == Some(index));
            match index {
                1 => {
                    alternative.add_utility_term(SIZE_ALT1, unit.size);
                }
                2 => {
                    alternative.add_utility_term(SIZE_ALT2, unit.size);
                }
                _ => {}
            }
        }
    }

    fn observed(&self, unit: &Household) -> Option<usize> {
        unit.observed
    }

    fn apply(&self, unit: &mut Household, choice: Choice) {
        unit.vehicles = Some(choice.index);
    }
}

/// Like [`VehicleModel`] but leaves every alternative unavailable for the
/// listed units, so their decisions fault.
struct FaultyModel {
    factory: CalculatorFactory,
    bad:     Vec<UnitId>,
}

impl FaultyModel {
    fn new(bad: Vec<UnitId>) -> Self {
        let spec = ModelSpec {
            name:               "faulty".to_owned(),
            total_alternatives: 3,
            total_nests:        0,
            levels:             1,
            max_parameter:      10,
        };
        Self { factory: CalculatorFactory::new(spec, coefficients()).unwrap(), bad }
    }
}

impl ChoiceModel for FaultyModel {
    type Unit = Household;

    fn name(&self) -> &str {
        "faulty"
    }

    fn purpose(&self) -> Purpose {
        Purpose(8)
    }

    fn factory(&self) -> &CalculatorFactory {
        &self.factory
    }

    fn build(&self, unit: &Household, calculator: &mut ChoiceCalculator) {
        let alive = !self.bad.contains(&unit.id);
        for index in 0..3 {
            calculator.alternative(index, alive, false);
        }
    }

    fn apply(&self, unit: &mut Household, choice: Choice) {
        unit.vehicles = Some(choice.index);
    }
}

#[derive(Default)]
struct CountingObserver {
    starts:       usize,
    start_mode:   Option<RunMode>,
    choices:      usize,
    observations: usize,
    validations:  usize,
    skipped:      usize,
    ends:         usize,
}

impl PassObserver for CountingObserver {
    fn on_pass_start(&mut self, _model: &str, mode: RunMode, _units: usize) {
        self.starts += 1;
        self.start_mode = Some(mode);
    }

    fn on_choice(&mut self, _unit: UnitId, _choice: &Choice) {
        self.choices += 1;
    }

    fn on_observation(&mut self, _observation: Observation) {
        self.observations += 1;
    }

    fn on_validation(&mut self, _validation: &Validation) {
        self.validations += 1;
    }

    fn on_skipped(&mut self, _unit: UnitId) {
        self.skipped += 1;
    }

    fn on_pass_end(&mut self, _summary: &PassSummary) {
        self.ends += 1;
    }
}

/// Keeps everything the pass hands out, for content assertions.
#[derive(Default)]
struct CaptureObserver {
    observations: Vec<Observation>,
    validations:  Vec<Validation>,
}

impl PassObserver for CaptureObserver {
    fn on_observation(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    fn on_validation(&mut self, validation: &Validation) {
        self.validations.push(validation.clone());
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn zero_workers_rejected() {
        let config = RunConfig::application(SEED).with_workers(0);
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
        assert!(PassRunner::new(config).is_err());
    }

    #[test]
    fn estimation_requires_target_model() {
        let config =
            RunConfig { seed: SEED, mode: RunMode::Estimation, workers: None, target_model: None };
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn validation_requires_target_model() {
        let config =
            RunConfig { seed: SEED, mode: RunMode::Validation, workers: None, target_model: None };
        assert!(config.validate().is_err());
    }

    #[test]
    fn effective_mode_scopes_the_target() {
        let config = RunConfig::estimation(SEED, "vehicles");
        assert_eq!(config.effective_mode("vehicles"), RunMode::Estimation);
        // Every other model still simulates, so upstream state is real.
        assert_eq!(config.effective_mode("mode_choice"), RunMode::Application);

        let config = RunConfig::application(SEED);
        assert_eq!(config.effective_mode("vehicles"), RunMode::Application);
    }

    #[test]
    fn calc_mode_mapping() {
        assert_eq!(RunMode::Application.calc_mode(), CalcMode::Application);
        assert_eq!(RunMode::Estimation.calc_mode(), CalcMode::Estimation);
        // Validation wants real probabilities.
        assert_eq!(RunMode::Validation.calc_mode(), CalcMode::Application);
    }
}

// ── WorkerContext ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod worker_tests {
    use super::*;

    #[test]
    fn streams_depend_on_unit_not_worker() {
        let mut a = WorkerContext::new(WorkerId(0), SEED, RunMode::Application);
        let mut b = WorkerContext::new(WorkerId(9), SEED, RunMode::Application);
        let draw_a = a.stream_for(UnitId(17), Purpose(3)).uniform();
        let draw_b = b.stream_for(UnitId(17), Purpose(3)).uniform();
        assert_eq!(draw_a, draw_b);
    }

    #[test]
    fn reseed_restarts_the_decision_sequence() {
        let mut context = WorkerContext::new(WorkerId(0), SEED, RunMode::Application);
        let first = context.stream_for(UnitId(5), Purpose(1)).uniform();
        context.stream_for(UnitId(6), Purpose(1)).uniform();
        // Coming back to the same decision replays it exactly.
        let again = context.stream_for(UnitId(5), Purpose(1)).uniform();
        assert_eq!(first, again);
    }

    #[test]
    fn purpose_isolates_streams() {
        let mut context = WorkerContext::new(WorkerId(0), SEED, RunMode::Application);
        let a = context.stream_for(UnitId(5), Purpose(1)).uniform();
        let b = context.stream_for(UnitId(5), Purpose(2)).uniform();
        assert_ne!(a, b);
    }

    #[test]
    fn validation_runs_application_calculators() {
        let context = WorkerContext::new(WorkerId(0), SEED, RunMode::Validation);
        assert!(context.is_validating());
        assert_eq!(context.calc_mode(), CalcMode::Application);
    }
}

// ── Application passes ────────────────────────────────────────────────────────

#[cfg(test)]
mod application_tests {
    use super::*;

    #[test]
    fn pass_applies_every_unit() {
        let model = VehicleModel::new();
        let mut units = households(10);
        let mut observer = CountingObserver::default();
        let runner = PassRunner::new(RunConfig::application(SEED)).unwrap();

        let summary = runner.run(&model, &mut units, &mut observer).unwrap();

        assert_eq!(summary.mode, RunMode::Application);
        assert_eq!(summary.units, 10);
        assert_eq!(summary.chosen, 10);
        assert_eq!(summary.skipped, 0);
        assert!(units.iter().all(|h| h.vehicles.is_some()));
        assert_eq!(observer.starts, 1);
        assert_eq!(observer.ends, 1);
        assert_eq!(observer.choices, 10);
        assert_eq!(observer.start_mode, Some(RunMode::Application));
    }

    #[test]
    fn chosen_counts_partition_the_units() {
        let model = VehicleModel::new();
        let mut units = households(40);
        let runner = PassRunner::new(RunConfig::application(SEED)).unwrap();

        let summary = runner.run(&model, &mut units, &mut NoopObserver).unwrap();

        assert_eq!(summary.chosen_counts.len(), 3);
        assert_eq!(summary.chosen_counts.iter().sum::<usize>(), summary.chosen);
        for (index, count) in summary.chosen_counts.iter().enumerate() {
            let applied = units.iter().filter(|h| h.vehicles == Some(index)).count();
            assert_eq!(applied, *count);
        }
    }

    #[test]
    fn results_identical_for_any_worker_count() {
        let model = VehicleModel::new();
        let mut alone = households(25);
        let mut crowd = alone.clone();

        let runner = PassRunner::new(RunConfig::application(SEED).with_workers(1)).unwrap();
        runner.run(&model, &mut alone, &mut NoopObserver).unwrap();
        let runner = PassRunner::new(RunConfig::application(SEED).with_workers(4)).unwrap();
        runner.run(&model, &mut crowd, &mut NoopObserver).unwrap();

        let alone: Vec<_> = alone.iter().map(|h| h.vehicles).collect();
        let crowd: Vec<_> = crowd.iter().map(|h| h.vehicles).collect();
        assert_eq!(alone, crowd);
    }

    #[test]
    fn repeated_runs_reproduce_exactly() {
        let model = VehicleModel::new();
        let mut first = households(25);
        let mut second = first.clone();
        let runner = PassRunner::new(RunConfig::application(SEED)).unwrap();

        let summary_first = runner.run(&model, &mut first, &mut NoopObserver).unwrap();
        let summary_second = runner.run(&model, &mut second, &mut NoopObserver).unwrap();

        assert_eq!(summary_first, summary_second);
        assert!(first.iter().zip(&second).all(|(a, b)| a.vehicles == b.vehicles));
    }

    #[test]
    fn different_seeds_change_choices() {
        let model = VehicleModel::new();
        let mut first = households(64);
        let mut second = first.clone();

        PassRunner::new(RunConfig::application(SEED))
            .unwrap()
            .run(&model, &mut first, &mut NoopObserver)
            .unwrap();
        PassRunner::new(RunConfig::application(SEED + 1))
            .unwrap()
            .run(&model, &mut second, &mut NoopObserver)
            .unwrap();

        let first: Vec<_> = first.iter().map(|h| h.vehicles).collect();
        let second: Vec<_> = second.iter().map(|h| h.vehicles).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn estimation_run_applies_upstream_models() {
        // The run targets some other model, so this pass falls back to
        // application mode and writes choices.
        let model = VehicleModel::new();
        let mut units = households(10);
        let mut observer = CountingObserver::default();
        let runner = PassRunner::new(RunConfig::estimation(SEED, "mode_choice")).unwrap();

        let summary = runner.run(&model, &mut units, &mut observer).unwrap();

        assert_eq!(summary.mode, RunMode::Application);
        assert_eq!(summary.chosen, 10);
        assert_eq!(observer.start_mode, Some(RunMode::Application));
        assert!(units.iter().all(|h| h.vehicles.is_some()));
    }
}

// ── Estimation passes ─────────────────────────────────────────────────────────

#[cfg(test)]
mod estimation_tests {
    use super::*;

    #[test]
    fn surveyed_units_export_and_rest_skip() {
        let model = VehicleModel::new();
        let mut units = households(12);
        let surveyed = units.iter().filter(|h| h.observed.is_some()).count();
        let mut observer = CountingObserver::default();
        let runner = PassRunner::new(RunConfig::estimation(SEED, "vehicles")).unwrap();

        let summary = runner.run(&model, &mut units, &mut observer).unwrap();

        assert_eq!(summary.mode, RunMode::Estimation);
        assert_eq!(summary.observed, surveyed);
        assert_eq!(summary.skipped, 12 - surveyed);
        assert_eq!(summary.chosen, 0);
        assert_eq!(observer.observations, surveyed);
        assert_eq!(observer.skipped, 12 - surveyed);
        // Nothing is written back in estimation mode.
        assert!(units.iter().all(|h| h.vehicles.is_none()));
    }

    #[test]
    fn observations_carry_raw_covariates() {
        let model = VehicleModel::new();
        let mut units = households(8);
        let mut observer = CaptureObserver::default();
        let runner = PassRunner::new(RunConfig::estimation(SEED, "vehicles")).unwrap();

        runner.run(&model, &mut units, &mut observer).unwrap();

        let expected: Vec<_> = units.iter().filter(|h| h.observed.is_some()).collect();
        assert_eq!(observer.observations.len(), expected.len());
        for (observation, unit) in observer.observations.iter().zip(expected) {
            assert_eq!(observation.model, "vehicles");
            assert_eq!(observation.unit, unit.id);
            assert_eq!(observation.observed, unit.observed.unwrap());
            assert!(observation.terms(0).unwrap().is_empty());
            assert_eq!(observation.terms(1).unwrap(), &[(SIZE_ALT1, unit.size)]);
            assert_eq!(observation.terms(2).unwrap(), &[(SIZE_ALT2, unit.size)]);
        }
    }

    #[test]
    fn observations_arrive_in_unit_order() {
        let model = VehicleModel::new();
        let mut units = households(20);
        let mut observer = CaptureObserver::default();
        let runner =
            PassRunner::new(RunConfig::estimation(SEED, "vehicles").with_workers(3)).unwrap();

        runner.run(&model, &mut units, &mut observer).unwrap();

        let ids: Vec<_> = observer.observations.iter().map(|o| o.unit).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}

// ── Validation passes ─────────────────────────────────────────────────────────

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn surveyed_units_validate_and_rest_skip() {
        let model = VehicleModel::new();
        let mut units = households(12);
        let surveyed = units.iter().filter(|h| h.observed.is_some()).count();
        let mut observer = CountingObserver::default();
        let runner = PassRunner::new(RunConfig::validation(SEED, "vehicles")).unwrap();

        let summary = runner.run(&model, &mut units, &mut observer).unwrap();

        assert_eq!(summary.mode, RunMode::Validation);
        assert_eq!(summary.validated, surveyed);
        assert_eq!(summary.skipped, 12 - surveyed);
        assert_eq!(summary.chosen, 0);
        assert_eq!(observer.validations, surveyed);
        assert!(units.iter().all(|h| h.vehicles.is_none()));
    }

    #[test]
    fn validations_score_the_observed_choice() {
        let model = VehicleModel::new();
        let mut units = households(12);
        let mut observer = CaptureObserver::default();
        let runner = PassRunner::new(RunConfig::validation(SEED, "vehicles")).unwrap();

        runner.run(&model, &mut units, &mut observer).unwrap();

        for validation in &observer.validations {
            assert!(validation.observed_available);
            assert!(validation.observed_probability > 0.0);
            assert!((validation.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn validation_predicts_what_application_would_choose() {
        // Same seed, same per-(unit, purpose) streams: the re-simulated
        // prediction must equal the application-pass choice.
        let model = VehicleModel::new();
        let mut applied = households(12);
        let mut surveyed = applied.clone();

        PassRunner::new(RunConfig::application(SEED))
            .unwrap()
            .run(&model, &mut applied, &mut NoopObserver)
            .unwrap();

        let mut observer = CaptureObserver::default();
        PassRunner::new(RunConfig::validation(SEED, "vehicles"))
            .unwrap()
            .run(&model, &mut surveyed, &mut observer)
            .unwrap();

        for validation in &observer.validations {
            let unit = applied.iter().find(|h| h.id == validation.unit).unwrap();
            assert_eq!(Some(validation.predicted), unit.vehicles);
        }
    }
}

// ── Faults ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fault_tests {
    use super::*;

    #[test]
    fn dead_unit_aborts_the_pass() {
        let model = FaultyModel::new(vec![UnitId(5)]);
        let mut units = households(10);
        let runner = PassRunner::new(RunConfig::application(SEED)).unwrap();

        let error = runner.run(&model, &mut units, &mut NoopObserver).unwrap_err();

        match error {
            SimError::Unit { unit, model: name, source } => {
                assert_eq!(unit, UnitId(5));
                assert_eq!(name, "faulty");
                assert!(matches!(source, LogitError::NoAvailableAlternative { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn earliest_fault_wins_regardless_of_chunking() {
        let model = FaultyModel::new(vec![UnitId(7), UnitId(3)]);
        let mut units = households(10);
        let runner = PassRunner::new(RunConfig::application(SEED).with_workers(4)).unwrap();

        let error = runner.run(&model, &mut units, &mut NoopObserver).unwrap_err();

        assert!(matches!(error, SimError::Unit { unit: UnitId(3), .. }));
    }

    #[test]
    fn outcomes_before_the_fault_stay_applied() {
        let model = FaultyModel::new(vec![UnitId(3)]);
        let mut units = households(6);
        let runner = PassRunner::new(RunConfig::application(SEED)).unwrap();

        assert!(runner.run(&model, &mut units, &mut NoopObserver).is_err());

        assert!(units[0].vehicles.is_some());
        assert!(units[1].vehicles.is_some());
        assert!(units[2..].iter().all(|h| h.vehicles.is_none()));
    }
}
