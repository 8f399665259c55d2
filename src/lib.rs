//! Client-side churn scoring pipeline: CSV upload → remote predictions →
//! summary, plus the server-side export download.

pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod predict;
pub mod summary;
pub mod types;

pub use config::Config;
pub use error::{PipelineError, Result};
pub use export::{DeliveredFile, DeliverySink, ExportService, FileSink};
pub use ingest::{ingest, UploadedFile};
pub use pipeline::{
    Notification, Observer, PipelineController, PipelineState, RunOutcome, TracingObserver,
};
pub use predict::PredictionClient;
pub use summary::{summarize, Summary};
pub use types::{column_label, Prediction, PredictionRecord, PredictionSet, RowRecord, Scalar};
