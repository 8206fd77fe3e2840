//! HTTP exam source and result store.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use examkit_core::model::Exam;
use examkit_core::traits::{ExamSource, ResultStore, SaveResultRequest};

use crate::error::StoreError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared client settings for both HTTP backends.
#[derive(Clone)]
struct HttpBackend {
    base_url: String,
    api_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::RequestFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.is_empty()),
            timeout_secs,
            client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs)
        } else {
            StoreError::RequestFailed(e.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// Turn a non-success response into a [`StoreError`].
async fn error_for_status(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if status == 401 || status == 403 {
        return StoreError::AuthenticationFailed(body);
    }
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    StoreError::ApiError { status, message }
}

// ---------------------------------------------------------------------------
// Exam source
// ---------------------------------------------------------------------------

/// Fetches exams with `GET {base_url}/exams/{id}`.
pub struct HttpExamSource {
    backend: HttpBackend,
}

impl HttpExamSource {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            backend: HttpBackend::new(base_url, api_token, timeout_secs)?,
        })
    }
}

#[async_trait]
impl ExamSource for HttpExamSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.backend.base_url))]
    async fn get_exam_by_id(&self, id: &str) -> anyhow::Result<Option<Exam>> {
        let url = format!("{}/exams/{}", self.backend.base_url, id);
        let response = self
            .backend
            .authorize(self.backend.client.get(&url))
            .send()
            .await
            .map_err(|e| self.backend.send_error(e))?;

        let status = response.status().as_u16();
        if status == 404 {
            tracing::debug!(exam = id, "exam not found at source");
            return Ok(None);
        }
        if status >= 400 {
            return Err(error_for_status(response).await.into());
        }

        let exam: Exam = response.json().await.map_err(|e| StoreError::ApiError {
            status,
            message: format!("failed to parse exam: {e}"),
        })?;
        Ok(Some(exam))
    }
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// Saves results with `POST {base_url}/results`.
pub struct HttpResultStore {
    backend: HttpBackend,
}

impl HttpResultStore {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            backend: HttpBackend::new(base_url, api_token, timeout_secs)?,
        })
    }
}

#[async_trait]
impl ResultStore for HttpResultStore {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(exam = %request.test_id, attempt = %request.attempt_id))]
    async fn save_result(&self, request: &SaveResultRequest) -> anyhow::Result<()> {
        let url = format!("{}/results", self.backend.base_url);
        let response = self
            .backend
            .authorize(self.backend.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| self.backend.send_error(e))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await.into());
        }
        Ok(())
    }
}
