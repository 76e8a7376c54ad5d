//! The entity a model decides for.

use dcm_core::UnitId;

/// One decision-making entity: a person, a household, a tour, a trip.
///
/// The id keys the entity's draw stream, so it must be stable across runs
/// and worker counts.  `sequence` distinguishes repeated decisions by the
/// same entity under the same model (the third tour of the day gets a
/// different draw stream than the first); entities that decide once per
/// pass keep the default.
pub trait DecisionUnit: Send + Sync {
    fn id(&self) -> UnitId;

    fn sequence(&self) -> u32 {
        0
    }
}
