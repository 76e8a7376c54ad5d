//! The single-use choice probability calculator.

use std::sync::Arc;

use dcm_core::{CoefficientSet, DrawStream, UnitId};

use crate::alternative::{Alternative, Nest};
use crate::error::{LogitError, LogitResult};
use crate::factory::ModelSpec;
use crate::observation::{Observation, ObservationAlternative};
use crate::solver::{self, Choice, ChoiceProbabilities};
use crate::validation::Validation;

/// Operating mode of one calculator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalcMode {
    /// Monte-Carlo simulation: accumulate scalar utilities, then sample.
    Application,
    /// Estimation export: record raw covariates for the external package.
    Estimation,
}

/// Accumulates one decision for one unit, then is consumed exactly once.
///
/// Single use is enforced by ownership: the building methods borrow
/// mutably, the consuming methods ([`simulate`], [`simulate_validated`],
/// [`compute_logsum`], [`into_probabilities`], [`into_observation`]) take
/// the calculator by value, so a second consumption does not compile.
///
/// Faults hit while building (out-of-range indexes, non-finite terms,
/// conflicting definitions, bad dissimilarities) do not interrupt model
/// code: the first one is recorded and the calculator goes inert, and the
/// fault surfaces as the `Err` of whichever consuming method runs.
///
/// [`simulate`]: Self::simulate
/// [`simulate_validated`]: Self::simulate_validated
/// [`compute_logsum`]: Self::compute_logsum
/// [`into_probabilities`]: Self::into_probabilities
/// [`into_observation`]: Self::into_observation
pub struct ChoiceCalculator {
    spec:         Arc<ModelSpec>,
    coefficients: Arc<CoefficientSet>,
    mode:         CalcMode,
    unit:         UnitId,
    alternatives: Vec<Alternative>,
    nests:        Vec<Option<Nest>>,
    fault:        Option<LogitError>,
}

impl ChoiceCalculator {
    pub(crate) fn new(
        spec: Arc<ModelSpec>,
        coefficients: Arc<CoefficientSet>,
        unit: UnitId,
        mode: CalcMode,
    ) -> Self {
        let alternatives = (0..spec.total_alternatives).map(Alternative::new).collect();
        let nests = vec![None; spec.total_nests];
        Self { spec, coefficients, mode, unit, alternatives, nests, fault: None }
    }

    #[inline]
    pub fn mode(&self) -> CalcMode {
        self.mode
    }

    #[inline]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    #[inline]
    pub fn model_name(&self) -> &str {
        &self.spec.name
    }

    /// True once a building fault has been recorded.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.fault.is_some()
    }

    /// Reference alternative `index`, defining it on first touch.
    ///
    /// Re-referencing is fine as long as the flags repeat; a conflicting
    /// re-mark records a fault.  The `observed` flag tags the chosen
    /// alternative in estimation and validation runs and is carried but
    /// unused in plain application runs.
    pub fn alternative(&mut self, index: usize, available: bool, observed: bool) -> AlternativeHandle<'_> {
        if self.fault.is_none() {
            if index >= self.alternatives.len() {
                self.fault = Some(LogitError::Configuration {
                    model: self.spec.name.clone(),
                    message: format!(
                        "alternative index {index} outside 0..{}",
                        self.alternatives.len()
                    ),
                });
            } else {
                let alternative = &mut self.alternatives[index];
                if !alternative.defined {
                    alternative.defined = true;
                    alternative.available = available;
                    alternative.observed = observed;
                } else if alternative.available != available || alternative.observed != observed {
                    self.fault = Some(LogitError::InconsistentAlternative {
                        model: self.spec.name.clone(),
                        alternative: index,
                    });
                }
            }
        }
        AlternativeHandle { calculator: self, index }
    }

    /// Solve into unconditional probabilities without sampling.
    pub fn into_probabilities(mut self) -> LogitResult<ChoiceProbabilities> {
        if let Some(fault) = self.fault.take() {
            return Err(fault);
        }
        if self.mode != CalcMode::Application {
            return Err(LogitError::Configuration {
                model: self.spec.name.clone(),
                message: "estimation-mode calculator cannot solve probabilities".to_owned(),
            });
        }
        solver::solve(&self.spec.name, self.unit, &self.alternatives, &self.nests)
    }

    /// Composite utility of the whole set, the accessibility covariate fed
    /// into upstream models.  Consumes no randomness, so logsum queries
    /// never shift a unit's draw sequence.
    pub fn compute_logsum(self) -> LogitResult<f64> {
        Ok(self.into_probabilities()?.logsum())
    }

    /// Simulate the decision, consuming exactly one uniform draw.
    pub fn simulate(self, stream: &mut DrawStream) -> LogitResult<Choice> {
        Ok(self.into_probabilities()?.draw(stream))
    }

    /// Simulate as [`simulate`] does, and also report how the solved set
    /// treated the observed choice, for validating an estimated model
    /// against its own estimation data.
    ///
    /// [`simulate`]: Self::simulate
    pub fn simulate_validated(
        self,
        stream: &mut DrawStream,
        observed: usize,
    ) -> LogitResult<(Choice, Validation)> {
        let unit = self.unit;
        let probabilities = self.into_probabilities()?;
        let choice = probabilities.draw(stream);
        let validation = Validation {
            unit,
            observed,
            observed_available: probabilities.is_available(observed),
            observed_probability: probabilities.probability(observed),
            predicted: choice.index,
            probabilities: probabilities.probabilities().to_vec(),
            availability: probabilities.availability().to_vec(),
        };
        Ok((choice, validation))
    }

    /// Export the accumulated covariates as one estimation observation.
    ///
    /// Returns `Ok(None)` when the decision does not pin down exactly one
    /// observed alternative; such units are skipped, not errors, so one
    /// bad survey record cannot abort an estimation run.
    pub fn into_observation(mut self) -> LogitResult<Option<Observation>> {
        if let Some(fault) = self.fault.take() {
            return Err(fault);
        }
        if self.mode != CalcMode::Estimation {
            return Err(LogitError::Configuration {
                model: self.spec.name.clone(),
                message: "application-mode calculator cannot export an observation".to_owned(),
            });
        }
        let observed: Vec<usize> = self
            .alternatives
            .iter()
            .filter(|a| a.is_observed())
            .map(Alternative::index)
            .collect();
        if observed.len() != 1 {
            return Ok(None);
        }
        let alternatives = self
            .alternatives
            .into_iter()
            .map(|a| ObservationAlternative {
                index:     a.index,
                available: a.defined && a.available,
                nest:      a.nest,
                terms:     a.terms,
            })
            .collect();
        Ok(Some(Observation {
            model: self.spec.name.clone(),
            unit: self.unit,
            observed: observed[0],
            alternatives,
        }))
    }
}

/// Borrowed view of one alternative inside a calculator.
///
/// All methods are infallible and chainable; problems poison the owning
/// calculator instead of failing the call.
pub struct AlternativeHandle<'a> {
    calculator: &'a mut ChoiceCalculator,
    index:      usize,
}

impl AlternativeHandle<'_> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Add `value * coefficients[coefficient]` to the alternative's utility
    /// (application mode) or record the raw covariate (estimation mode).
    ///
    /// A term whose slot is out of range or undefined is inert in both
    /// modes, so shared model code keeps working when a deployment's
    /// coefficient file defines only a subset of the parameters.  In
    /// application mode zero-valued covariates are skipped; in estimation
    /// mode they are recorded as data.  Repeated terms for one slot
    /// accumulate by summation.
    pub fn add_utility_term(&mut self, coefficient: usize, value: f64) -> &mut Self {
        let calculator = &mut *self.calculator;
        if calculator.fault.is_some() {
            return self;
        }
        if !value.is_finite() {
            calculator.fault = Some(LogitError::NonFiniteUtility {
                model: calculator.spec.name.clone(),
                alternative: self.index,
                coefficient,
                value,
            });
            return self;
        }
        let Some(weight) = calculator.coefficients.value(coefficient) else {
            return self;
        };
        let alternative = &mut calculator.alternatives[self.index];
        match calculator.mode {
            CalcMode::Estimation => alternative.accumulate_term(coefficient, value),
            CalcMode::Application => {
                if value != 0.0 {
                    alternative.utility += value * weight;
                }
            }
        }
        self
    }

    /// Attach the alternative to nest `nest`, whose dissimilarity lives in
    /// coefficient slot `dissimilarity_parameter`.
    ///
    /// The first member to join defines the nest; later joins must name the
    /// same slot.  In application mode the dissimilarity is resolved right
    /// away and must lie in (0, 1]; in estimation mode only membership is
    /// recorded.
    pub fn join_nest(&mut self, nest: usize, dissimilarity_parameter: usize) -> &mut Self {
        let calculator = &mut *self.calculator;
        if calculator.fault.is_some() {
            return self;
        }
        if nest >= calculator.nests.len() {
            calculator.fault = Some(LogitError::Configuration {
                model: calculator.spec.name.clone(),
                message: format!("nest index {nest} outside 0..{}", calculator.nests.len()),
            });
            return self;
        }
        match calculator.nests[nest].as_ref().map(Nest::parameter) {
            None => {
                let dissimilarity = match calculator.mode {
                    CalcMode::Estimation => None,
                    CalcMode::Application => {
                        match calculator.coefficients.value(dissimilarity_parameter) {
                            Some(mu) if mu > 0.0 && mu <= 1.0 => Some(mu),
                            Some(mu) => {
                                calculator.fault = Some(LogitError::InvalidDissimilarity {
                                    model: calculator.spec.name.clone(),
                                    nest,
                                    value: mu,
                                });
                                return self;
                            }
                            None => {
                                calculator.fault = Some(LogitError::Configuration {
                                    model: calculator.spec.name.clone(),
                                    message: format!(
                                        "nest {nest}: dissimilarity slot {dissimilarity_parameter} is undefined"
                                    ),
                                });
                                return self;
                            }
                        }
                    }
                };
                calculator.nests[nest] = Some(Nest {
                    index: nest,
                    parameter: dissimilarity_parameter,
                    dissimilarity,
                });
            }
            Some(parameter) if parameter != dissimilarity_parameter => {
                calculator.fault = Some(LogitError::InconsistentAlternative {
                    model: calculator.spec.name.clone(),
                    alternative: self.index,
                });
                return self;
            }
            Some(_) => {}
        }
        let alternative = &mut calculator.alternatives[self.index];
        match alternative.nest {
            None => alternative.nest = Some(nest),
            Some(current) if current != nest => {
                calculator.fault = Some(LogitError::InconsistentAlternative {
                    model: calculator.spec.name.clone(),
                    alternative: self.index,
                });
            }
            Some(_) => {}
        }
        self
    }
}
