// src/pipeline/mod.rs

pub mod observer;
pub mod state;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::export::{DeliveredFile, DeliverySink, ExportService};
use crate::ingest::{ingest, UploadedFile};
use crate::predict::PredictionClient;
use crate::summary::{summarize, Summary};
use crate::types::PredictionSet;

pub use observer::{Notification, Observer, TracingObserver};
pub use state::PipelineState;

/// How a `file_selected` call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Predictions replaced; summary of the new set.
    Completed(Summary),
    /// The run failed and the controller is back to `Idle`.
    Failed(PipelineError),
    /// Another run was in flight; nothing happened.
    Rejected,
}

#[derive(Debug, Default)]
struct Inner {
    state: PipelineState,
    predictions: Arc<PredictionSet>,
}

/// Sequences ingest → submit → display and owns the current prediction set.
///
/// All mutation goes through the transition helpers below. The lock is held
/// only for the swap itself, never across an await, and the observer is
/// called after it is released.
pub struct PipelineController {
    predictor: PredictionClient,
    exporter: ExportService,
    observer: Arc<dyn Observer>,
    inner: Mutex<Inner>,
}

impl PipelineController {
    /// Build the clients from `config`; both share one HTTP connection pool.
    pub fn new(
        config: &Config,
        sink: Arc<dyn DeliverySink>,
        observer: Arc<dyn Observer>,
    ) -> Result<Self> {
        let client = config.http_client()?;
        let predictor = PredictionClient::with_client(client.clone(), config)?;
        let exporter = ExportService::with_client(client, config, sink)?;
        Ok(Self::from_parts(predictor, exporter, observer))
    }

    pub fn from_parts(
        predictor: PredictionClient,
        exporter: ExportService,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            predictor,
            exporter,
            observer,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.lock().state
    }

    pub fn can_accept_file(&self) -> bool {
        self.state().accepts_file()
    }

    /// Read-only handle on the current predictions. Later runs swap in a new
    /// set; a handle taken earlier keeps seeing the old one.
    pub fn predictions(&self) -> Arc<PredictionSet> {
        Arc::clone(&self.lock().predictions)
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.predictions())
    }

    /// Run the whole pipeline for `file`.
    ///
    /// Rejected without side effects while another run is ingesting or
    /// awaiting predictions. On failure the previous prediction set is kept.
    #[instrument(level = "info", skip(self, file), fields(name = %file.name))]
    pub async fn file_selected(&self, file: UploadedFile) -> RunOutcome {
        if !self.begin_run() {
            warn!(state = %self.state(), "run already in flight, ignoring file");
            return RunOutcome::Rejected;
        }
        let _guard = RunGuard(self);
        let start = Instant::now();

        let rows = match ingest(file).await {
            Ok(rows) => rows,
            Err(e) => return self.fail(e),
        };
        self.transition(PipelineState::AwaitingPrediction);

        let predictions = match self.predictor.submit(&rows).await {
            Ok(set) => set,
            Err(e) => return self.fail(e),
        };
        drop(rows);

        let received_at = predictions.received_at();
        let summary = self.display(predictions);
        info!(
            records = summary.total(),
            churn = summary.churn_count,
            received_at = ?received_at,
            elapsed = ?start.elapsed(),
            "run complete"
        );
        RunOutcome::Completed(summary)
    }

    /// Fetch the server-side export. Independent of the pipeline state and of
    /// the prediction set on display; a failure leaves both untouched.
    pub async fn request_export(&self) -> Result<DeliveredFile> {
        match self.exporter.request_export().await {
            Ok(delivered) => {
                self.observer.notify(&Notification::ExportDelivered {
                    file_name: delivered.file_name.clone(),
                });
                Ok(delivered)
            }
            Err(e) => {
                self.observer.notify(&Notification::Error(e.clone()));
                Err(e)
            }
        }
    }

    // ─── transitions ────────────────────────────────────────────────

    /// `Idle | Displaying → Ingesting`, atomically. False if busy.
    fn begin_run(&self) -> bool {
        let from = {
            let mut inner = self.lock();
            if !inner.state.accepts_file() {
                return false;
            }
            let from = inner.state;
            inner.state = PipelineState::Ingesting;
            from
        };
        self.observer.state_changed(from, PipelineState::Ingesting);
        true
    }

    fn transition(&self, to: PipelineState) {
        let from = std::mem::replace(&mut self.lock().state, to);
        self.observer.state_changed(from, to);
    }

    /// `→ Failed → Idle`, surfacing the error once. Predictions are untouched.
    fn fail(&self, err: PipelineError) -> RunOutcome {
        self.transition(PipelineState::Failed);
        self.observer.notify(&Notification::Error(err.clone()));
        self.transition(PipelineState::Idle);
        RunOutcome::Failed(err)
    }

    /// `AwaitingPrediction → Displaying`, replacing the set wholesale.
    fn display(&self, predictions: PredictionSet) -> Summary {
        let summary = summarize(&predictions);
        let from = {
            let mut inner = self.lock();
            inner.predictions = Arc::new(predictions);
            std::mem::replace(&mut inner.state, PipelineState::Displaying)
        };
        self.observer.state_changed(from, PipelineState::Displaying);
        self.observer.notify(&Notification::PredictionsReady {
            records: summary.total(),
        });
        summary
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resets a run that was dropped mid-flight. After `fail` or `display` the
/// state is already at rest and this does nothing.
struct RunGuard<'a>(&'a PipelineController);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let state = self.0.state();
        if state.is_busy() {
            warn!(%state, "run cancelled before completion, back to Idle");
            self.0.transition(PipelineState::Idle);
        }
    }
}

impl std::fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("PipelineController")
            .field("state", &inner.state)
            .field("predictions", &inner.predictions.len())
            .field("predictor", &self.predictor)
            .field("exporter", &self.exporter)
            .finish()
    }
}
