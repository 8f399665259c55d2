// src/export/mod.rs

pub mod sink;

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{PipelineError, Result};

pub use sink::{DeliveredFile, DeliverySink, FileSink};

/// Fetches the server-generated export and hands it to a sink.
///
/// The payload is whatever the service last produced. It is never rebuilt
/// from the prediction set currently on display, so the two can disagree.
#[derive(Clone)]
pub struct ExportService {
    client: Client,
    endpoint: Url,
    file_name: String,
    sink: Arc<dyn DeliverySink>,
}

impl ExportService {
    pub fn new(config: &Config, sink: Arc<dyn DeliverySink>) -> Result<Self> {
        Self::with_client(config.http_client()?, config, sink)
    }

    pub fn with_client(
        client: Client,
        config: &Config,
        sink: Arc<dyn DeliverySink>,
    ) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: config.download_url()?,
            file_name: config.export_file_name.clone(),
            sink,
        })
    }

    /// `GET {base}/download`, then deliver as the configured file name.
    /// The sink only sees the payload once the whole body has arrived.
    #[instrument(level = "info", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn request_export(&self) -> Result<DeliveredFile> {
        let bytes = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| PipelineError::download(format!("GET {} failed: {e}", self.endpoint)))?
            .error_for_status()
            .map_err(|e| PipelineError::download(format!("non-success status: {e}")))?
            .bytes()
            .await
            .map_err(|e| PipelineError::download(format!("reading export body: {e}")))?;

        let delivered = self
            .sink
            .deliver(&self.file_name, &bytes)
            .map_err(|e| PipelineError::download(format!("delivering {}: {e}", self.file_name)))?;
        info!(file = %delivered.file_name, bytes = delivered.size_bytes, "export delivered");
        Ok(delivered)
    }
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportService")
            .field("endpoint", &self.endpoint.as_str())
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}
