//! Training-set construction for the sessionlab pipeline.
//!
//! This crate provides:
//! - Session summarization (one row per labeled session)
//! - Sliding-window training-sample assembly
//! - CSV persistence of the dataset
//! - The batch driver running many instruments in parallel

pub mod batch;
pub mod builder;
pub mod summary;
pub mod writer;

pub use batch::{BatchReport, BatchResult, InstrumentBars, InstrumentFailure, Pipeline};
pub use builder::TrainingSetBuilder;
pub use summary::summarize_sessions;
pub use writer::{write_samples, write_samples_to_path};
