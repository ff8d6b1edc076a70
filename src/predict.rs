use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PredictError, PREDICTION_FAILED};
use crate::form::PredictionRequest;

#[derive(Deserialize)]
struct PredictResponse {
    prediction: Option<f64>,
    error: Option<String>,
}

/// Client for the remote `POST {base}/predict` service.
#[derive(Clone, Debug)]
pub struct PredictionClient {
    http: reqwest::Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        PredictionClient {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }

    /// One round trip, no retries.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<f64, PredictError> {
        let url = self.endpoint();
        debug!(%url, "posting prediction request");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| PredictError::Transport(format!("send {url}: {e}")))?;

        let status = response.status();
        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictError::Transport(format!("read response ({status}): {e}")))?;

        if status.is_success() {
            body.prediction
                .ok_or_else(|| PredictError::Transport(format!("{status} without prediction")))
        } else {
            debug!(%status, "prediction service rejected request");
            Err(PredictError::Application(
                body.error.unwrap_or_else(|| PREDICTION_FAILED.to_string()),
            ))
        }
    }
}
