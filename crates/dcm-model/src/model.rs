//! The per-model interface a pass runner drives.

use dcm_core::Purpose;
use dcm_logit::{CalculatorFactory, Choice, ChoiceCalculator};

use crate::unit::DecisionUnit;

/// One choice model: a named alternative space, a utility specification,
/// and a way to write the outcome back onto the unit.
///
/// A model is built once, owns its [`CalculatorFactory`] (and through it
/// the coefficient set), and is shared read-only across workers.  Per-unit
/// state lives entirely in the calculator handed to [`build`], so the same
/// specification code serves application, estimation, and validation runs;
/// it can branch on [`ChoiceCalculator::mode`] when it needs to mark the
/// observed alternative.
///
/// [`build`]: Self::build
pub trait ChoiceModel: Send + Sync {
    type Unit: DecisionUnit;

    /// Stable model name; output scoping and error reports carry it.
    fn name(&self) -> &str;

    /// Purpose tag isolating this model's draw stream from every other
    /// model's, so adding a model never shifts another model's draws.
    fn purpose(&self) -> Purpose;

    fn factory(&self) -> &CalculatorFactory;

    /// Mark alternatives and pour in utility terms for one decision.
    ///
    /// Problems poison the calculator rather than failing the call, so
    /// utility expressions stay free of error plumbing.
    fn build(&self, unit: &Self::Unit, calculator: &mut ChoiceCalculator);

    /// Surveyed choice for this unit, if known.  Estimation and validation
    /// runs skip units that return `None`.
    fn observed(&self, _unit: &Self::Unit) -> Option<usize> {
        None
    }

    /// Write a simulated outcome back onto the unit.
    fn apply(&self, unit: &mut Self::Unit, choice: Choice);
}
