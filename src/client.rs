use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::api::{CodingHelpRequest, DetailsRequest, ErrorResponse, SearchRequest, SearchResponse};
use crate::shape::{CodingHelpResponse, ExplanationMode, Language, ServiceDetail, ServiceResult};

/// HTTP client for the civic-guide server API.
pub struct GuideApiClient {
    http: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl GuideApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Abandon calls that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn search(&self, query: &str, language: Language) -> Result<Vec<ServiceResult>> {
        let request = SearchRequest {
            query: query.to_string(),
            language,
        };
        let response: SearchResponse = self.post("search", &request).await?;
        Ok(response.results)
    }

    pub async fn get_details(
        &self,
        service_name: &str,
        language: Language,
        mode: ExplanationMode,
    ) -> Result<ServiceDetail> {
        let request = DetailsRequest {
            service_name: service_name.to_string(),
            language,
            mode,
        };
        self.post("details", &request).await
    }

    pub async fn get_coding_help(&self, input: &str, language: Language) -> Result<CodingHelpResponse> {
        let request = CodingHelpRequest {
            input: input.to_string(),
            language,
        };
        self.post("coding-help", &request).await
    }

    async fn post<I, O>(&self, path: &str, body: &I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let call = self.send(path, body);
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| anyhow!("Request timed out after {:?}", timeout))?,
            None => call.await,
        }
    }

    async fn send<I, O>(&self, path: &str, body: &I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let url = format!("{}/api/v1/{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP call to {url} failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| format!("{} ({})", e.error, e.kind))
                .unwrap_or(text);
            return Err(anyhow!("Server returned {status}: {message}"));
        }

        resp.json()
            .await
            .map_err(|e| anyhow!("Failed to decode response from {url}: {e}"))
    }
}
