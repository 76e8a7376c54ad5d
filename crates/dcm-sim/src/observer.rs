//! Pass observer trait for progress reporting and data collection.

use dcm_core::UnitId;
use dcm_logit::{Choice, Observation, Validation};

use crate::config::RunMode;
use crate::runner::PassSummary;

/// Callbacks invoked by [`PassRunner::run`][crate::PassRunner::run] during
/// the sequential apply phase, in ascending unit order.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Estimation recorders hang off
/// [`on_observation`], which hands the observation over by value.
///
/// [`on_observation`]: Self::on_observation
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ChoicePrinter;
///
/// impl PassObserver for ChoicePrinter {
///     fn on_choice(&mut self, unit: UnitId, choice: &Choice) {
///         println!("{unit} picked {} (p = {:.3})", choice.index, choice.probability);
///     }
/// }
/// ```
pub trait PassObserver {
    /// Called once before the produce phase starts.
    fn on_pass_start(&mut self, _model: &str, _mode: RunMode, _units: usize) {}

    /// A simulated choice was applied back onto its unit.
    fn on_choice(&mut self, _unit: UnitId, _choice: &Choice) {}

    /// An estimation observation was exported.
    fn on_observation(&mut self, _observation: Observation) {}

    /// A surveyed unit was re-simulated against its observed choice.
    fn on_validation(&mut self, _validation: &Validation) {}

    /// A unit was skipped for missing or ambiguous ground truth.
    fn on_skipped(&mut self, _unit: UnitId) {}

    /// Called once after the apply phase completes.
    fn on_pass_end(&mut self, _summary: &PassSummary) {}
}

/// A [`PassObserver`] that does nothing.  Use when you need to call `run`
/// but don't want callbacks.
pub struct NoopObserver;

impl PassObserver for NoopObserver {}
