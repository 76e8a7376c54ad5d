//! The pass runner: partition, produce, apply.

use dcm_core::WorkerId;
use dcm_model::{ChoiceModel, DecisionUnit};

use crate::config::{RunConfig, RunMode};
use crate::error::{SimError, SimResult};
use crate::observer::PassObserver;
use crate::worker::WorkerContext;

// ── Per-unit produce output ───────────────────────────────────────────────────

/// What the produce phase computed for one unit.  Applying these in
/// ascending unit order on one thread is what keeps runs reproducible.
enum Outcome {
    Chosen(dcm_logit::Choice),
    Observed(dcm_logit::Observation),
    Validated(dcm_logit::Validation),
    Skipped,
}

// ── PassRunner ────────────────────────────────────────────────────────────────

/// Runs one model over a unit collection as a three-phase pass.
///
/// 1. **Partition**: split the units into contiguous per-worker chunks.
/// 2. **Produce** (parallel with the `parallel` feature): each worker walks
///    its chunk with an owned [`WorkerContext`], builds one single-use
///    calculator per unit, and consumes it per the pass mode.  This phase
///    only reads the units.
/// 3. **Apply** (sequential, ascending unit order): write choices back via
///    [`ChoiceModel::apply`], hand observations and validations to the
///    observer, and count.  The first faulted unit aborts the pass;
///    outcomes already applied stay applied.
///
/// The pass mode is resolved per model through
/// [`RunConfig::effective_mode`], so an estimation run still applies every
/// model upstream of its target.
pub struct PassRunner {
    config: RunConfig,
}

impl PassRunner {
    pub fn new(config: RunConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run one pass.  Units are visited in slice order, which must be
    /// ascending unit id for reproducible output ordering.
    pub fn run<M, O>(
        &self,
        model: &M,
        units: &mut [M::Unit],
        observer: &mut O,
    ) -> SimResult<PassSummary>
    where
        M: ChoiceModel,
        O: PassObserver,
    {
        let mode = self.config.effective_mode(model.name());
        log::info!(
            "pass start: model={} mode={mode:?} units={}",
            model.name(),
            units.len()
        );
        observer.on_pass_start(model.name(), mode, units.len());

        // ── Phase 1 + 2: partition and produce ────────────────────────────
        let outcomes = self.produce(model, mode, units);

        // ── Phase 3: apply ────────────────────────────────────────────────
        let mut summary = PassSummary {
            model:         model.name().to_owned(),
            mode,
            units:         units.len(),
            chosen:        0,
            chosen_counts: vec![0; model.factory().spec().total_alternatives],
            observed:      0,
            validated:     0,
            skipped:       0,
        };
        for (unit, outcome) in units.iter_mut().zip(outcomes) {
            match outcome? {
                Outcome::Chosen(choice) => {
                    model.apply(unit, choice);
                    observer.on_choice(unit.id(), &choice);
                    summary.chosen += 1;
                    summary.chosen_counts[choice.index] += 1;
                }
                Outcome::Observed(observation) => {
                    observer.on_observation(observation);
                    summary.observed += 1;
                }
                Outcome::Validated(validation) => {
                    observer.on_validation(&validation);
                    summary.validated += 1;
                }
                Outcome::Skipped => {
                    log::debug!("model {}: skipped unit {}", model.name(), unit.id());
                    observer.on_skipped(unit.id());
                    summary.skipped += 1;
                }
            }
        }

        log::info!(
            "pass end: model={} chosen={} observed={} validated={} skipped={}",
            summary.model,
            summary.chosen,
            summary.observed,
            summary.validated,
            summary.skipped
        );
        observer.on_pass_end(&summary);
        Ok(summary)
    }

    /// Produce an outcome per unit, in unit order.  Faults are carried as
    /// per-unit `Err`s rather than short-circuiting, so the apply phase
    /// surfaces the earliest faulted unit no matter how chunks were laid
    /// out.
    fn produce<M: ChoiceModel>(
        &self,
        model: &M,
        mode: RunMode,
        units: &[M::Unit],
    ) -> Vec<SimResult<Outcome>> {
        let workers = self.worker_count(units.len());
        let chunk_size = units.len().div_ceil(workers).max(1);
        let seed = self.config.seed;

        #[cfg(not(feature = "parallel"))]
        {
            let mut outcomes = Vec::with_capacity(units.len());
            for (index, chunk) in units.chunks(chunk_size).enumerate() {
                let mut context = WorkerContext::new(WorkerId(index as u32), seed, mode);
                outcomes.extend(chunk.iter().map(|unit| produce_one(model, &mut context, unit)));
            }
            outcomes
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            units
                .par_chunks(chunk_size)
                .enumerate()
                .flat_map_iter(|(index, chunk)| {
                    let mut context = WorkerContext::new(WorkerId(index as u32), seed, mode);
                    chunk
                        .iter()
                        .map(move |unit| produce_one(model, &mut context, unit))
                        .collect::<Vec<_>>()
                })
                .collect()
        }
    }

    fn worker_count(&self, units: usize) -> usize {
        self.config.workers.unwrap_or_else(default_workers).clamp(1, units.max(1))
    }
}

/// One decision, end to end, on one worker.
fn produce_one<M: ChoiceModel>(
    model: &M,
    context: &mut WorkerContext,
    unit: &M::Unit,
) -> SimResult<Outcome> {
    let mut calculator = model.factory().calculator(unit.id(), context.calc_mode());
    model.build(unit, &mut calculator);
    let fault = |source| SimError::Unit {
        unit:   unit.id(),
        model:  model.name().to_owned(),
        source,
    };

    match context.mode() {
        RunMode::Application => {
            let purpose = model.purpose().offset(unit.sequence());
            let stream = context.stream_for(unit.id(), purpose);
            let choice = calculator.simulate(stream).map_err(fault)?;
            Ok(Outcome::Chosen(choice))
        }
        RunMode::Estimation => match calculator.into_observation().map_err(fault)? {
            Some(observation) => Ok(Outcome::Observed(observation)),
            None => Ok(Outcome::Skipped),
        },
        RunMode::Validation => {
            let Some(observed) = model.observed(unit) else {
                return Ok(Outcome::Skipped);
            };
            let purpose = model.purpose().offset(unit.sequence());
            let stream = context.stream_for(unit.id(), purpose);
            let (_, validation) =
                calculator.simulate_validated(stream, observed).map_err(fault)?;
            Ok(Outcome::Validated(validation))
        }
    }
}

#[cfg(feature = "parallel")]
fn default_workers() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
fn default_workers() -> usize {
    1
}

// ── PassSummary ───────────────────────────────────────────────────────────────

/// Counts from one completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassSummary {
    pub model: String,
    /// Mode the pass actually ran in, after target-model resolution.
    pub mode:  RunMode,
    pub units: usize,
    /// Simulated choices written back onto units.
    pub chosen: usize,
    /// Simulated choices per alternative index; sums to `chosen`.
    pub chosen_counts: Vec<usize>,
    /// Observations exported for estimation.
    pub observed: usize,
    /// Surveyed units re-simulated for validation.
    pub validated: usize,
    /// Units skipped for missing or ambiguous ground truth.
    pub skipped: usize,
}
