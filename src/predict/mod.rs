// src/predict/mod.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::types::{PredictionRecord, PredictionSet, RowRecord};

#[derive(Serialize)]
struct PredictRequest<'a> {
    data: &'a [RowRecord],
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Value>,
}

/// Single-attempt client for `POST {base}/predict`.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    endpoint: Url,
}

impl PredictionClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            endpoint: config.predict_url()?,
        })
    }

    /// Reuse an existing `reqwest::Client` (connection pool shared with export).
    pub fn with_client(client: Client, config: &Config) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: config.predict_url()?,
        })
    }

    /// Submit `rows` and return the predictions in response order.
    ///
    /// Any transport error, non-2xx status or response that is not
    /// `{ "predictions": [{ ..., "prediction": 0|1 }] }` is `BackendUnavailable`.
    /// There is no retry; the user re-runs the whole pipeline instead.
    #[instrument(
        level = "info",
        skip(self, rows),
        fields(endpoint = %self.endpoint, rows = rows.len())
    )]
    pub async fn submit(&self, rows: &[RowRecord]) -> Result<PredictionSet> {
        let body = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequest { data: rows })
            .send()
            .await
            .map_err(|e| PipelineError::backend(format!("POST {} failed: {e}", self.endpoint)))?
            .error_for_status()
            .map_err(|e| PipelineError::backend(format!("non-success status: {e}")))?
            .bytes()
            .await
            .map_err(|e| PipelineError::backend(format!("reading response body: {e}")))?;
        debug!(bytes = body.len(), "prediction response received");

        let set = decode_predictions(&body)?;
        if set.len() != rows.len() {
            // Not fatal: the service owns the response shape.
            warn!(sent = rows.len(), received = set.len(), "row count mismatch");
        }
        info!(predictions = set.len(), "predictions received");
        Ok(set)
    }
}

/// Validate the response envelope and every record in it.
pub fn decode_predictions(body: &[u8]) -> Result<PredictionSet> {
    let resp: PredictResponse = serde_json::from_slice(body)
        .map_err(|e| PipelineError::backend(format!("malformed prediction response: {e}")))?;

    let records = resp
        .predictions
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            PredictionRecord::try_from(v)
                .map_err(|reason| PipelineError::backend(format!("prediction #{i}: {reason}")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PredictionSet::new(records))
}
