use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::protocol::{responses_route, submit_route, AnswerSet, StoredResponse, SubmitOutcome};
use tracing::debug;
use url::Url;

use crate::{error::StoreError, AnswerStore};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Answer store reached over the `/api/submit` and `/api/responses` routes.
#[derive(Debug, Clone)]
pub struct HttpAnswerStore {
    http: Client,
    base_url: Url,
}

impl HttpAnswerStore {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(server_url).map_err(|source| StoreError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        // Relative joins keep a path prefix only when the base ends in `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Transport)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(route.trim_start_matches('/'))
            .map_err(|source| StoreError::InvalidUrl {
                url: format!("{}{route}", self.base_url),
                source,
            })
    }
}

#[async_trait]
impl AnswerStore for HttpAnswerStore {
    async fn submit(&self, answers: &AnswerSet) -> Result<SubmitOutcome, StoreError> {
        let url = self.endpoint(submit_route())?;
        debug!(%url, answers = answers.answers.len(), "posting survey answers");
        let res = self.http.post(url).json(answers).send().await?;
        let res = reject_failure_status(res).await?;
        let outcome: SubmitOutcome = res.json().await?;
        if !outcome.success {
            return Err(StoreError::Rejected {
                status: 200,
                message: outcome.error.unwrap_or_else(|| "submission declined".into()),
            });
        }
        Ok(outcome)
    }

    async fn list(&self) -> Result<Vec<StoredResponse>, StoreError> {
        let url = self.endpoint(responses_route())?;
        let res = self.http.get(url).send().await?;
        let res = reject_failure_status(res).await?;
        Ok(res.json().await?)
    }
}

/// Turns a non-2xx response into [`StoreError::Rejected`], keeping the
/// server's `error` text when the body carries one.
async fn reject_failure_status(res: Response) -> Result<Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<SubmitOutcome>(&body)
        .ok()
        .and_then(|outcome| outcome.error)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
