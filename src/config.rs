// src/config.rs

use std::time::Duration;

use url::Url;

use crate::error::{PipelineError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const EXPORT_FILE_NAME: &str = "predictions.csv";

const PREDICT_PATH: &str = "predict";
const DOWNLOAD_PATH: &str = "download";

/// Where the scoring service lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    /// `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,
    pub export_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: None,
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Build a config for `base_url`, keeping every other default.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PipelineError::config(format!("invalid base URL {base_url:?}: {e}")))?;
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn predict_url(&self) -> Result<Url> {
        self.endpoint(PREDICT_PATH)
    }

    pub fn download_url(&self) -> Result<Url> {
        self.endpoint(DOWNLOAD_PATH)
    }

    /// `Url::join` drops the last path segment unless the base ends in `/`,
    /// so normalise first: `http://h/api` and `http://h/api/` both give
    /// `http://h/api/<path>`.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| PipelineError::config(format!("building {path} endpoint: {e}")))
    }

    /// Shared HTTP client honouring the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| PipelineError::config(format!("building HTTP client: {e}")))
    }
}
