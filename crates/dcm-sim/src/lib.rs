//! `dcm-sim` — batch pass orchestration for the rust_dcm framework.
//!
//! # Three-phase passes
//!
//! ```text
//! for each pass (one model over a unit collection):
//!   ① Partition — split units into contiguous per-worker chunks.
//!   ② Produce   — each worker walks its chunk with an owned WorkerContext,
//!                 reseeds the draw stream per (unit, purpose), and solves
//!                 one single-use calculator per unit
//!                 (parallel with the `parallel` feature).
//!   ③ Apply     — sequential, ascending unit order:
//!                   Chosen(..)    → ChoiceModel::apply; on_choice
//!                   Observed(..)  → on_observation
//!                   Validated(..) → on_validation
//!                   Skipped       → on_skipped
//!                 The first faulted unit aborts the pass.
//! ```
//!
//! Because every decision reseeds from `(global seed, unit, purpose)`, pass
//! results are identical for any worker count or chunk layout.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `parallel` | Runs the produce phase on Rayon's thread pool.    |
//! | `serde`    | Serde derives on configuration and summary types. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dcm_sim::{NoopObserver, PassRunner, RunConfig};
//!
//! let runner = PassRunner::new(RunConfig::application(42))?;
//! let summary = runner.run(&mode_choice, &mut tours, &mut NoopObserver)?;
//! println!("applied {} choices", summary.chosen);
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod runner;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::{RunConfig, RunMode};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, PassObserver};
pub use runner::{PassRunner, PassSummary};
pub use worker::WorkerContext;
