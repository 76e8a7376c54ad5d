//! Parquet dataset backend (feature `parquet`).
//!
//! The Arrow schema is data-dependent — one `Float64` field per assigned
//! term column — so the file and its writer are created at flush time;
//! nothing exists on disk until the recorder finishes.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::layout::ObservationLayout;
use crate::row::ObservationRow;
use crate::sink::ObservationSink;
use crate::EstimationResult;

fn dataset_schema(layout: &ObservationLayout) -> Arc<Schema> {
    let mut fields = Vec::with_capacity(layout.width());
    fields.push(Field::new("unit", DataType::UInt64, false));
    fields.push(Field::new("observed", DataType::UInt64, false));
    for alternative in 0..layout.total_alternatives() {
        fields.push(Field::new(format!("avail{alternative}"), DataType::Boolean, false));
    }
    for &(alternative, coefficient) in layout.term_columns() {
        fields.push(Field::new(
            format!("u{alternative}_c{coefficient}"),
            DataType::Float64,
            false,
        ));
    }
    Arc::new(Schema::new(fields))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes the estimation dataset to one Parquet file.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetSink {
    path:   PathBuf,
    writer: Option<ArrowWriter<File>>,
}

impl ParquetSink {
    /// A sink that will create its file at `path` when the dataset is
    /// flushed.
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf(), writer: None }
    }
}

impl ObservationSink for ParquetSink {
    fn write_all(
        &mut self,
        layout: &ObservationLayout,
        rows: &[ObservationRow],
    ) -> EstimationResult<()> {
        let schema = dataset_schema(layout);

        let mut units = UInt64Builder::new();
        let mut observed = UInt64Builder::new();
        let mut availability: Vec<BooleanBuilder> =
            (0..layout.total_alternatives()).map(|_| BooleanBuilder::new()).collect();
        let mut values: Vec<Float64Builder> =
            (0..layout.term_width()).map(|_| Float64Builder::new()).collect();

        for row in rows {
            units.append_value(row.unit.0);
            observed.append_value(row.observed as u64);
            for (builder, &flag) in availability.iter_mut().zip(&row.availability) {
                builder.append_value(flag);
            }
            for (builder, &value) in values.iter_mut().zip(&row.values) {
                builder.append_value(value);
            }
        }

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(layout.width());
        columns.push(Arc::new(units.finish()));
        columns.push(Arc::new(observed.finish()));
        columns.extend(availability.into_iter().map(|mut b| Arc::new(b.finish()) as ArrayRef));
        columns.extend(values.into_iter().map(|mut b| Arc::new(b.finish()) as ArrayRef));

        let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;
        let file = File::create(&self.path)?;
        let mut writer = ArrowWriter::try_new(file, schema, Some(snappy_props()))?;
        writer.write(&batch)?;
        self.writer = Some(writer);
        Ok(())
    }

    fn finish(&mut self) -> EstimationResult<()> {
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}
