//! Nested logsum calls between models.
//!
//! An upper model asks a lower model for the composite utility of a
//! hypothetical choice situation and feeds the answer in as a covariate:
//! destination choice consumes mode-choice logsums, day patterns consume
//! destination logsums.  The call graph is explicit; a model that needs
//! logsums owns a [`LogsumEngine`] over the lower model.

use dcm_core::{LocationId, TimeWindow, UnitId};
use dcm_logit::{CalcMode, CalculatorFactory, ChoiceCalculator, LogitError, LogitResult};

/// Inputs for one hypothetical lower-model choice situation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NestedCall {
    pub origin:      LocationId,
    pub destination: LocationId,
    /// Window the traveler could plausibly arrive in.
    pub arrival:     TimeWindow,
    /// Window the traveler could plausibly depart in.
    pub departure:   TimeWindow,
    /// Extra context scalars whose meaning belongs to the lower model.
    /// The classic one is the number of cars the hypothetical traveler may
    /// use, which upper models vary to form logsum differences.
    pub extras:      Vec<f64>,
}

impl NestedCall {
    pub fn new(origin: LocationId, destination: LocationId) -> Self {
        Self {
            origin,
            destination,
            arrival: TimeWindow::ALL_DAY,
            departure: TimeWindow::ALL_DAY,
            extras: Vec::new(),
        }
    }

    pub fn with_windows(mut self, arrival: TimeWindow, departure: TimeWindow) -> Self {
        self.arrival = arrival;
        self.departure = departure;
        self
    }

    /// Append one context scalar.
    pub fn with_extra(mut self, value: f64) -> Self {
        self.extras.push(value);
        self
    }

    /// Context scalar `index`; missing scalars read as zero.
    #[inline]
    pub fn extra(&self, index: usize) -> f64 {
        self.extras.get(index).copied().unwrap_or(0.0)
    }
}

/// A model whose composite utility other models consume.
pub trait NestedModel: Send + Sync {
    fn name(&self) -> &str;

    fn factory(&self) -> &CalculatorFactory;

    /// Pour the call's choice set into a fresh calculator.
    fn build_nested(&self, unit: UnitId, call: &NestedCall, calculator: &mut ChoiceCalculator);
}

/// Runs nested calls against one lower model.
///
/// Calculators built here are always application mode, whatever mode the
/// outer pass runs in: a logsum is only defined over scalar utilities, and
/// an estimation pass still wants real accessibility covariates.  Logsum
/// calls consume no randomness, so wiring a new one into a model never
/// shifts anyone's draw sequence.
pub struct LogsumEngine<M> {
    model: M,
}

impl<M: NestedModel> LogsumEngine<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Composite utility of the lower model's choice set for this call, or
    /// `None` when the call leaves no alternative available.
    pub fn logsum(&self, unit: UnitId, call: &NestedCall) -> LogitResult<Option<f64>> {
        let mut calculator = self.model.factory().calculator(unit, CalcMode::Application);
        self.model.build_nested(unit, call, &mut calculator);
        match calculator.compute_logsum() {
            Ok(value) => Ok(Some(value)),
            Err(LogitError::NoAvailableAlternative { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// The common covariate form: an infeasible call contributes zero.
    pub fn logsum_or_zero(&self, unit: UnitId, call: &NestedCall) -> LogitResult<f64> {
        Ok(self.logsum(unit, call)?.unwrap_or(0.0))
    }
}
