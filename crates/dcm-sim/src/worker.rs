//! Owned per-worker state for the produce phase.

use dcm_core::{DrawStream, Purpose, UnitId, WorkerId};
use dcm_logit::CalcMode;

use crate::config::RunMode;

/// Everything one worker owns while walking its chunk of units.
///
/// Nothing here is shared, so chunks run on separate threads without locks.
/// The stream reseeds per decision from `(unit, purpose)`, which is what
/// makes pass results independent of the worker count and chunk layout:
/// any worker positioned on a unit produces that unit's exact sequence.
pub struct WorkerContext {
    worker: WorkerId,
    mode:   RunMode,
    stream: DrawStream,
}

impl WorkerContext {
    pub fn new(worker: WorkerId, seed: u64, mode: RunMode) -> Self {
        Self { worker, mode, stream: DrawStream::new(seed) }
    }

    #[inline]
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    #[inline]
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    #[inline]
    pub fn calc_mode(&self) -> CalcMode {
        self.mode.calc_mode()
    }

    #[inline]
    pub fn is_estimating(&self) -> bool {
        self.mode == RunMode::Estimation
    }

    #[inline]
    pub fn is_validating(&self) -> bool {
        self.mode == RunMode::Validation
    }

    /// The worker's stream, reseeded for one `(unit, purpose)` decision.
    pub fn stream_for(&mut self, unit: UnitId, purpose: Purpose) -> &mut DrawStream {
        self.stream.reseed(unit, purpose);
        &mut self.stream
    }
}
