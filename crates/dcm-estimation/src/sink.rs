//! The `ObservationSink` trait implemented by all dataset backends.

use crate::layout::ObservationLayout;
use crate::row::ObservationRow;
use crate::EstimationResult;

/// Trait implemented by CSV, SQLite, Parquet, and in-memory sinks.
///
/// Sinks receive the whole dataset in one call because the column layout
/// is only final once the last observation has been recorded; streaming
/// rows out earlier would bake in a premature width.
pub trait ObservationSink {
    /// Write the complete padded dataset.  Called exactly once, by
    /// [`EstimationRecorder::finish`][crate::EstimationRecorder::finish].
    fn write_all(
        &mut self,
        layout: &ObservationLayout,
        rows: &[ObservationRow],
    ) -> EstimationResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> EstimationResult<()>;
}

/// Keeps the dataset in memory.  For tests and for callers that
/// post-process rows themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub headers: Vec<String>,
    pub rows:    Vec<ObservationRow>,
}

impl ObservationSink for MemorySink {
    fn write_all(
        &mut self,
        layout: &ObservationLayout,
        rows: &[ObservationRow],
    ) -> EstimationResult<()> {
        self.headers = layout.headers();
        self.rows = rows.to_vec();
        Ok(())
    }

    fn finish(&mut self) -> EstimationResult<()> {
        Ok(())
    }
}
