//! Per-model calculator factory.

use std::sync::Arc;

use dcm_core::{CoefficientSet, UnitId};

use crate::calculator::{CalcMode, ChoiceCalculator};
use crate::error::{LogitError, LogitResult};

/// Static identity and dimensions of one choice model, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelSpec {
    /// Model name; estimation output and error reports carry it.
    pub name:               String,
    /// Size of the zero-based alternative index space.
    pub total_alternatives: usize,
    /// Number of nests below the root; zero for a flat multinomial model.
    pub total_nests:        usize,
    /// Tree depth: 1 is flat, 2 puts one nest level below the root.
    pub levels:             usize,
    /// Highest coefficient slot the model's utility expressions reference.
    pub max_parameter:      usize,
}

/// Hands out single-use calculators for one model.
///
/// Built once per model at startup, which is where the dimensions are
/// validated, then shared read-only across workers.  Calculators are fresh
/// per decision and never pooled, so nothing here is mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct CalculatorFactory {
    spec:         Arc<ModelSpec>,
    coefficients: Arc<CoefficientSet>,
}

impl CalculatorFactory {
    pub fn new(spec: ModelSpec, coefficients: Arc<CoefficientSet>) -> LogitResult<Self> {
        let configuration = |message: String| LogitError::Configuration {
            model: spec.name.clone(),
            message,
        };
        if spec.total_alternatives == 0 {
            return Err(configuration("a model needs at least one alternative".to_owned()));
        }
        if !(1..=2).contains(&spec.levels) {
            return Err(configuration(format!("levels must be 1 or 2, got {}", spec.levels)));
        }
        if spec.levels == 1 && spec.total_nests > 0 {
            return Err(configuration(format!(
                "{} nests declared but levels is 1",
                spec.total_nests
            )));
        }
        if spec.levels == 2 && spec.total_nests == 0 {
            return Err(configuration("levels is 2 but no nests declared".to_owned()));
        }
        if coefficients.max_parameter() < spec.max_parameter {
            return Err(configuration(format!(
                "model references coefficient slot {} but the set ends at {}",
                spec.max_parameter,
                coefficients.max_parameter()
            )));
        }
        Ok(Self { spec: Arc::new(spec), coefficients })
    }

    #[inline]
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    #[inline]
    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coefficients
    }

    /// A fresh single-use calculator for one decision by `unit`.
    pub fn calculator(&self, unit: UnitId, mode: CalcMode) -> ChoiceCalculator {
        ChoiceCalculator::new(Arc::clone(&self.spec), Arc::clone(&self.coefficients), unit, mode)
    }
}
