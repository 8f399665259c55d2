// src/pipeline/observer.rs

use tracing::{error, info, warn};

use super::state::PipelineState;
use crate::error::PipelineError;

/// One-shot, user-facing message produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PredictionsReady { records: usize },
    ExportDelivered { file_name: String },
    Error(PipelineError),
}

impl Notification {
    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }

    /// Text for whatever shows notifications to the user.
    pub fn message(&self) -> String {
        match self {
            Notification::PredictionsReady { records } => {
                format!("Predictions generated successfully for {records} records")
            }
            Notification::ExportDelivered { file_name } => {
                format!("{file_name} downloaded successfully")
            }
            Notification::Error(e) => match e {
                PipelineError::InvalidFileType { .. } => "Please upload a CSV file".to_string(),
                PipelineError::ParseFailure { .. } => "Failed to parse CSV file".to_string(),
                PipelineError::BackendUnavailable { .. } => {
                    "Failed to generate predictions. Make sure the backend is running.".to_string()
                }
                PipelineError::InvalidConfig { .. } => "Invalid configuration".to_string(),
                PipelineError::DownloadFailure { .. } => "Failed to download CSV".to_string(),
            },
        }
    }
}

/// Presentation-side hooks. Called outside the controller's lock.
pub trait Observer: Send + Sync {
    fn state_changed(&self, _from: PipelineState, _to: PipelineState) {}

    fn notify(&self, notification: &Notification);
}

/// Logs every transition and notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn state_changed(&self, from: PipelineState, to: PipelineState) {
        info!(from = from.as_str(), to = to.as_str(), "pipeline state");
    }

    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::Error(e @ PipelineError::InvalidFileType { .. }) => {
                warn!(kind = e.kind(), error = %e, "{}", notification.message())
            }
            Notification::Error(e) => {
                error!(kind = e.kind(), error = %e, "{}", notification.message())
            }
            _ => info!("{}", notification.message()),
        }
    }
}
