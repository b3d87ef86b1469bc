//! reqwest-backed [`RequestExecutor`]
//!
//! Attaches the bearer token, encodes query and body, and classifies the
//! response:
//! - 204 (or an empty 2xx body) is `ResponseBody::NoContent`
//! - any other 2xx is handed back as raw JSON
//! - non-2xx bodies are decoded as problem documents into `AmoError::Api`

use std::sync::Arc;

use amocrm_core::{AccessTokenProvider, ApiRequest, HttpMethod, RequestExecutor, ResponseBody};
use amocrm_domain::{AmoConfig, AmoError, ProblemDetails, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::into_domain;
use crate::http::{body_snippet, HttpClient};

/// Executes [`ApiRequest`]s against one account origin
pub struct HttpRequestExecutor {
    http: HttpClient,
    base_url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl HttpRequestExecutor {
    pub fn new(http: HttpClient, base_url: Url, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { http, base_url, tokens }
    }

    /// # Errors
    /// Returns `AmoError::Config` if the configured base URL is invalid.
    pub fn from_config(
        http: HttpClient,
        config: &AmoConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        Ok(Self::new(http, config.resolved_base_url()?, tokens))
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

const fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl RequestExecutor for HttpRequestExecutor {
    #[instrument(skip_all, fields(method = %request.method(), target = %request.target()))]
    async fn execute_raw(&self, request: &ApiRequest) -> Result<ResponseBody> {
        let url = request.resolve(&self.base_url)?;

        let mut builder = self
            .http
            .request(method(request.method()), url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params().pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if !request.is_token_endpoint() {
            let token = self.tokens.access_token().await?;
            builder = builder.bearer_auth(token.as_str());
        }

        let response = self.http.send(builder).await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            debug!("no content");
            return Ok(ResponseBody::NoContent);
        }

        let text = response.text().await.map_err(into_domain)?;
        if status.is_success() {
            return Ok(if text.trim().is_empty() {
                ResponseBody::NoContent
            } else {
                ResponseBody::Json(text)
            });
        }

        Err(problem_error(status, &text))
    }
}

fn problem_error(status: StatusCode, body: &str) -> AmoError {
    if body.trim().is_empty() {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        warn!(%status, "API request failed without a problem body");
        return AmoError::api(status.as_u16(), format!("HTTP {} {reason}", status.as_u16()));
    }

    match serde_json::from_str::<ProblemDetails>(body) {
        Ok(problem) => {
            let message = problem.compose_message();
            warn!(%status, %message, "API request failed");
            AmoError::api(status.as_u16(), message)
        }
        Err(err) => {
            debug!(%status, body = %body_snippet(body), "undecodable problem body");
            AmoError::Decode(format!("HTTP {status} with undecodable problem body: {err}"))
        }
    }
}
