//! CSV dataset backend.
//!
//! One file per recorder: a header row of column labels, then one row per
//! observation.  Availability flags are written as `0`/`1`.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::layout::ObservationLayout;
use crate::row::ObservationRow;
use crate::sink::ObservationSink;
use crate::EstimationResult;

/// Writes the estimation dataset to one CSV file.
pub struct CsvSink {
    writer:   Writer<File>,
    finished: bool,
}

impl CsvSink {
    /// Create (or truncate) the dataset file at `path`.
    pub fn new(path: &Path) -> EstimationResult<Self> {
        Ok(Self { writer: Writer::from_path(path)?, finished: false })
    }
}

impl ObservationSink for CsvSink {
    fn write_all(
        &mut self,
        layout: &ObservationLayout,
        rows: &[ObservationRow],
    ) -> EstimationResult<()> {
        self.writer.write_record(layout.headers())?;
        let mut record = Vec::with_capacity(layout.width());
        for row in rows {
            record.clear();
            record.push(row.unit.0.to_string());
            record.push(row.observed.to_string());
            record.extend(row.availability.iter().map(|&a| (a as u8).to_string()));
            record.extend(row.values.iter().map(f64::to_string));
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> EstimationResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}
