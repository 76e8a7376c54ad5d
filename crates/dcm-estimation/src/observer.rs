//! Pass-observer adapters bridging `dcm_sim::PassObserver` to the
//! recorder and the validation tallies.

use dcm_core::UnitId;
use dcm_logit::{Observation, Validation};
use dcm_sim::PassObserver;

use crate::recorder::EstimationRecorder;
use crate::sink::ObservationSink;
use crate::validation::ValidationStats;
use crate::{EstimationError, EstimationResult};

/// A [`PassObserver`] that feeds an estimation pass into an
/// [`EstimationRecorder`].
///
/// Recorder errors are stored internally because observer methods have no
/// return value.  After the pass returns, check with
/// [`take_error`][Self::take_error], then finish the recorder.
pub struct RecorderObserver<S: ObservationSink> {
    recorder:   EstimationRecorder<S>,
    last_error: Option<EstimationError>,
}

impl<S: ObservationSink> RecorderObserver<S> {
    pub fn new(recorder: EstimationRecorder<S>) -> Self {
        Self { recorder, last_error: None }
    }

    /// Take the stored recorder error (if any) after the pass returns.
    ///
    /// Returns `None` if every observation was recorded.
    pub fn take_error(&mut self) -> Option<EstimationError> {
        self.last_error.take()
    }

    /// Unwrap the inner recorder, to finish it and flush the dataset.
    pub fn into_recorder(self) -> EstimationRecorder<S> {
        self.recorder
    }

    fn store_err(&mut self, result: EstimationResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<S: ObservationSink> PassObserver for RecorderObserver<S> {
    fn on_observation(&mut self, observation: Observation) {
        let result = self.recorder.record(&observation);
        self.store_err(result);
    }

    fn on_skipped(&mut self, _unit: UnitId) {
        self.recorder.skip();
    }
}

/// A [`PassObserver`] that tallies a validation pass into
/// [`ValidationStats`].
pub struct ValidationObserver {
    stats: ValidationStats,
}

impl ValidationObserver {
    pub fn new(total_alternatives: usize) -> Self {
        Self { stats: ValidationStats::new(total_alternatives) }
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub fn into_stats(self) -> ValidationStats {
        self.stats
    }
}

impl PassObserver for ValidationObserver {
    fn on_validation(&mut self, validation: &Validation) {
        self.stats.record(validation);
    }

    fn on_skipped(&mut self, _unit: UnitId) {
        self.stats.count_skip();
    }
}
