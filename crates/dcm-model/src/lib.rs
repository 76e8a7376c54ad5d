//! `dcm-model` — the traits that turn the logit engine into a model system.
//!
//! | Module     | Contents                                         |
//! |------------|--------------------------------------------------|
//! | [`unit`]   | [`DecisionUnit`]                                 |
//! | [`model`]  | [`ChoiceModel`]                                  |
//! | [`logsum`] | [`NestedCall`], [`NestedModel`], [`LogsumEngine`] |
//!
//! A [`ChoiceModel`] describes one decision: its alternative space, its
//! utility specification, and how the outcome lands back on the
//! [`DecisionUnit`].  Models that feed composite utilities upward also
//! implement [`NestedModel`] and are called through a [`LogsumEngine`].
//! No new error type lives here; everything surfaces as
//! [`dcm_logit::LogitError`].

pub mod logsum;
pub mod model;
pub mod unit;


pub use logsum::{LogsumEngine, NestedCall, NestedModel};
pub use model::ChoiceModel;
pub use unit::DecisionUnit;
