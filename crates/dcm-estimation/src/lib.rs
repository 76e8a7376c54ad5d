//! `dcm-estimation` — estimation-dataset export and validation scoring
//! for the rust_dcm framework.
//!
//! An estimation pass emits one [`Observation`][dcm_logit::Observation]
//! per surveyed unit.  The [`EstimationRecorder`] flattens them into a
//! single rectangular dataset for the external estimation package: term
//! columns are assigned lazily, on first use, and earlier rows are padded
//! with zeros once the final width is known.
//!
//! Three file backends are provided behind Cargo features:
//!
//! | Feature   | Backend | File written                          |
//! |-----------|---------|---------------------------------------|
//! | *(none)*  | CSV     | one `.csv` dataset per recorder       |
//! | `sqlite`  | SQLite  | one `.db` with an `observations` table|
//! | `parquet` | Parquet | one `.parquet` dataset per recorder   |
//!
//! All backends implement [`ObservationSink`]; [`MemorySink`] keeps the
//! dataset in memory.  [`RecorderObserver`] and [`ValidationObserver`]
//! implement `dcm_sim::PassObserver`, so both plug straight into a pass.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dcm_estimation::{CsvSink, EstimationRecorder, RecorderObserver};
//!
//! let sink = CsvSink::new(Path::new("output/vehicles.csv"))?;
//! let recorder = EstimationRecorder::from_spec(model.factory().spec(), sink);
//! let mut observer = RecorderObserver::new(recorder);
//! runner.run(&model, &mut households, &mut observer)?;
//! if let Some(e) = observer.take_error() {
//!     return Err(e.into());
//! }
//! let summary = observer.into_recorder().finish()?;
//! println!("wrote {} rows x {} columns", summary.written, summary.columns);
//! ```

pub mod csv;
pub mod error;
pub mod layout;
pub mod observer;
pub mod recorder;
pub mod row;
pub mod sink;
pub mod validation;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvSink;
pub use error::{EstimationError, EstimationResult};
pub use layout::ObservationLayout;
pub use observer::{RecorderObserver, ValidationObserver};
pub use recorder::{EstimationRecorder, EstimationSummary};
pub use row::ObservationRow;
pub use sink::{MemorySink, ObservationSink};
pub use validation::ValidationStats;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;

#[cfg(feature = "parquet")]
pub use parquet::ParquetSink;
