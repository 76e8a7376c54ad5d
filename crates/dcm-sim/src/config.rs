//! Run configuration.

use dcm_logit::CalcMode;

use crate::error::{SimError, SimResult};

/// What a run does with each decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunMode {
    /// Simulate choices and write them back onto the units.
    Application,
    /// Export raw covariates for the external estimation package; nothing
    /// is written back.
    Estimation,
    /// Re-simulate surveyed units with estimated coefficients and tally
    /// predictions against observations; nothing is written back.
    Validation,
}

impl RunMode {
    /// Mode of the calculators handed to model code.  Validation runs the
    /// model in application mode on purpose: it wants real probabilities.
    pub fn calc_mode(self) -> CalcMode {
        match self {
            RunMode::Estimation => CalcMode::Estimation,
            RunMode::Application | RunMode::Validation => CalcMode::Application,
        }
    }
}

/// Global configuration for a set of passes.
///
/// The mode override is explicit: an estimation or validation run names the
/// one model it targets, and passes for every other model fall back to
/// application mode, so upstream models still feed real simulated state to
/// the model under estimation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Global seed every draw stream derives from.
    pub seed: u64,

    pub mode: RunMode,

    /// Produce-phase worker count.  `None` takes one worker per available
    /// thread when the `parallel` feature is on, otherwise one.
    pub workers: Option<usize>,

    /// Model under estimation or validation.
    pub target_model: Option<String>,
}

impl RunConfig {
    pub fn application(seed: u64) -> Self {
        Self { seed, mode: RunMode::Application, workers: None, target_model: None }
    }

    pub fn estimation(seed: u64, model: impl Into<String>) -> Self {
        Self {
            seed,
            mode: RunMode::Estimation,
            workers: None,
            target_model: Some(model.into()),
        }
    }

    pub fn validation(seed: u64, model: impl Into<String>) -> Self {
        Self {
            seed,
            mode: RunMode::Validation,
            workers: None,
            target_model: Some(model.into()),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.workers == Some(0) {
            return Err(SimError::Config("worker count must be nonzero".to_owned()));
        }
        if self.mode != RunMode::Application && self.target_model.is_none() {
            return Err(SimError::Config(
                "estimation and validation runs must name a target model".to_owned(),
            ));
        }
        Ok(())
    }

    /// Mode a pass for `model` actually runs in.
    pub fn effective_mode(&self, model: &str) -> RunMode {
        match self.mode {
            RunMode::Application => RunMode::Application,
            mode if self.target_model.as_deref() == Some(model) => mode,
            _ => RunMode::Application,
        }
    }
}
