//! Request envelopes and raw response bodies

use std::fmt;

use amocrm_domain::constants::{API_PREFIX, TOKEN_ENDPOINT_PATH};
use amocrm_domain::{AmoError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::query::QueryParams;

/// HTTP verbs used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API call: method, target, query and optional JSON body
///
/// The target is either a path relative to the account origin
/// (`/api/v4/leads`) or an absolute URL taken from a `next` link.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: HttpMethod,
    target: String,
    query: QueryParams,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, target: impl Into<String>) -> Self {
        Self { method, target: target.into(), query: QueryParams::default(), body: None }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, target)
    }

    #[must_use]
    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body
    ///
    /// # Errors
    /// Returns `AmoError::InvalidInput` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| AmoError::InvalidInput(format!("request body is not serializable: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn query_params(&self) -> &QueryParams {
        &self.query
    }

    pub fn query_params_mut(&mut self) -> &mut QueryParams {
        &mut self.query
    }

    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Same request aimed at another target, without query parameters.
    ///
    /// Used to follow absolute `next` links, which already carry their query.
    #[must_use]
    pub fn retarget(&self, target: impl Into<String>) -> Self {
        Self {
            method: self.method,
            target: target.into(),
            query: QueryParams::default(),
            body: self.body.clone(),
        }
    }

    #[must_use]
    pub fn is_absolute(&self) -> bool {
        is_absolute_url(&self.target)
    }

    /// Whether this call goes to the OAuth token endpoint, which must not
    /// carry a bearer token.
    #[must_use]
    pub fn is_token_endpoint(&self) -> bool {
        if self.is_absolute() {
            return Url::parse(&self.target).is_ok_and(|url| url.path() == TOKEN_ENDPOINT_PATH);
        }
        self.target.split('?').next().is_some_and(|path| {
            path.trim_start_matches('/') == TOKEN_ENDPOINT_PATH.trim_start_matches('/')
        })
    }

    /// Resolve the target against the account origin
    ///
    /// # Errors
    /// Returns `AmoError::InvalidInput` if the target is malformed or an
    /// absolute URL points at a different origin.
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        if self.is_absolute() {
            let url = Url::parse(&self.target)?;
            if url.origin() != base.origin() {
                return Err(AmoError::InvalidInput(format!(
                    "refusing to send credentials to foreign origin {}",
                    url.origin().ascii_serialization()
                )));
            }
            return Ok(url);
        }

        let path = if self.target.starts_with('/') {
            self.target.clone()
        } else {
            format!("/{}", self.target)
        };
        Ok(base.join(&path)?)
    }
}

/// `/api/v4/{resource}`
#[must_use]
pub fn api_path(resource: &str) -> String {
    format!("{API_PREFIX}/{}", resource.trim_start_matches('/'))
}

fn is_absolute_url(target: &str) -> bool {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Raw successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// HTTP 204, or an empty 2xx body.
    NoContent,
    Json(String),
}

impl ResponseBody {
    /// Decode the body; `None` for no content
    ///
    /// # Errors
    /// Returns `AmoError::Decode` if the JSON does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self {
            Self::NoContent => Ok(None),
            Self::Json(body) => serde_json::from_str(body).map(Some).map_err(|e| {
                AmoError::Decode(format!(
                    "failed to decode {}: {e}",
                    std::any::type_name::<T>().rsplit("::").next().unwrap_or("response")
                ))
            }),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NoContent)
    }
}
