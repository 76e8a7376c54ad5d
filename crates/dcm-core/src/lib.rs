//! `dcm-core` — foundational types for the `rust_dcm` choice-modeling framework.
//!
//! This crate is a dependency of every other `dcm-*` crate.  It intentionally
//! has no `dcm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`ids`]          | `UnitId`, `WorkerId`, `LocationId`                    |
//! | [`rng`]          | `DrawStream` (per-unit deterministic draws), `Purpose`|
//! | [`coefficients`] | `Coefficient`, `CoefficientSet`                       |
//! | [`window`]       | `TimeWindow` (minutes-of-day range)                   |
//! | [`error`]        | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod coefficients;
pub mod error;
pub mod ids;
pub mod rng;
pub mod window;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use coefficients::{Coefficient, CoefficientSet};
pub use error::{CoreError, CoreResult};
pub use ids::{LocationId, UnitId, WorkerId};
pub use rng::{DrawStream, Purpose};
pub use window::TimeWindow;
