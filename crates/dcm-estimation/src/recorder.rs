//! The estimation recorder: observations in, one rectangular dataset out.

use dcm_logit::{ModelSpec, Observation};

use crate::layout::ObservationLayout;
use crate::row::ObservationRow;
use crate::sink::ObservationSink;
use crate::{EstimationError, EstimationResult};

/// Collects one model's observations and flushes them through a sink as a
/// single rectangular dataset.
///
/// Rows are buffered until [`finish`] because the column layout keeps
/// growing while observations arrive; at flush every row is padded to the
/// final width and handed to the sink together with the header labels.
///
/// [`finish`]: Self::finish
pub struct EstimationRecorder<S: ObservationSink> {
    model:    String,
    layout:   ObservationLayout,
    rows:     Vec<ObservationRow>,
    skipped:  usize,
    sink:     S,
    finished: bool,
}

impl<S: ObservationSink> EstimationRecorder<S> {
    pub fn new(model: impl Into<String>, total_alternatives: usize, sink: S) -> Self {
        Self {
            model: model.into(),
            layout: ObservationLayout::new(total_alternatives),
            rows: Vec::new(),
            skipped: 0,
            sink,
            finished: false,
        }
    }

    /// A recorder dimensioned from a model's spec.
    pub fn from_spec(spec: &ModelSpec, sink: S) -> Self {
        Self::new(spec.name.clone(), spec.total_alternatives, sink)
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Rows recorded so far.
    #[inline]
    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Record one exported observation.
    pub fn record(&mut self, observation: &Observation) -> EstimationResult<()> {
        if self.finished {
            return Err(EstimationError::Finished);
        }
        if observation.model != self.model {
            return Err(EstimationError::ModelMismatch {
                expected: self.model.clone(),
                got:      observation.model.clone(),
            });
        }
        self.rows.push(self.layout.row(observation));
        Ok(())
    }

    /// Count one unit whose survey record did not pin down a choice.
    /// Skips are tallied, never written.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Pad every row to the final width, flush the dataset through the
    /// sink, and close it.
    pub fn finish(&mut self) -> EstimationResult<EstimationSummary> {
        if self.finished {
            return Err(EstimationError::Finished);
        }
        self.finished = true;
        for row in &mut self.rows {
            self.layout.pad(row);
        }
        self.sink.write_all(&self.layout, &self.rows)?;
        self.sink.finish()?;
        log::info!(
            "estimation dataset for {}: {} rows x {} columns, {} skipped",
            self.model,
            self.rows.len(),
            self.layout.width(),
            self.skipped
        );
        Ok(EstimationSummary {
            model:   self.model.clone(),
            written: self.rows.len(),
            skipped: self.skipped,
            columns: self.layout.width(),
        })
    }
}

/// Counts from one flushed estimation dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimationSummary {
    pub model:   String,
    /// Rows written to the sink.
    pub written: usize,
    /// Units whose survey record pinned down no single choice.
    pub skipped: usize,
    /// Total column count, fixed leading columns included.
    pub columns: usize,
}
