//! `dcm-logit` — alternative sets, nested-logit probabilities, and
//! Monte-Carlo choice simulation.
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`factory`]     | [`ModelSpec`], [`CalculatorFactory`]                      |
//! | [`calculator`]  | [`ChoiceCalculator`], [`AlternativeHandle`], [`CalcMode`] |
//! | [`alternative`] | [`Alternative`], [`Nest`]                                 |
//! | [`solver`]      | [`ChoiceProbabilities`], [`Choice`], the softmax core     |
//! | [`observation`] | [`Observation`], [`ObservationAlternative`]               |
//! | [`validation`]  | [`Validation`]                                            |
//! | [`error`]       | [`LogitError`], [`LogitResult`]                           |
//!
//! # Shape of a decision
//!
//! A [`CalculatorFactory`] is built once per model and validates the model's
//! dimensions against its coefficient set.  Each decision then gets a fresh
//! single-use [`ChoiceCalculator`]: model code references alternatives,
//! pours in utility terms, optionally nests them, and finally consumes the
//! calculator, either sampling a [`Choice`], computing a logsum, or
//! exporting an [`Observation`] for the external estimation package.
//!
//! Probabilities follow the normalized two-level nested logit: a nest with
//! dissimilarity `mu` contributes `mu * ln(sum of exp(U / mu))` to the root,
//! so `mu = 1` collapses exactly to the flat multinomial form.  All
//! exponentiation is max-shifted, which keeps severely negative utility
//! spreads out of underflow trouble without changing any probability.

pub mod alternative;
pub mod calculator;
pub mod error;
pub mod factory;
pub mod observation;
pub mod solver;
pub mod validation;


pub use alternative::{Alternative, Nest};
pub use calculator::{AlternativeHandle, CalcMode, ChoiceCalculator};
pub use error::{LogitError, LogitResult};
pub use factory::{CalculatorFactory, ModelSpec};
pub use observation::{Observation, ObservationAlternative};
pub use solver::{Choice, ChoiceProbabilities};
pub use validation::Validation;
