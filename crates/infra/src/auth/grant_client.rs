//! OAuth2 token endpoint client
//!
//! Exchanges authorization codes and refresh tokens at
//! `POST {base}/oauth2/access_token`. The request carries the integration's
//! client credentials in a JSON body, never in headers or the query string.

use amocrm_core::GrantClient;
use amocrm_domain::constants::TOKEN_ENDPOINT_PATH;
use amocrm_domain::{
    AmoConfig, AmoError, GrantRequest, GrantType, ProblemDetails, Result, TokenGrant,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::into_domain;
use crate::http::{body_snippet, HttpClient};

#[derive(Serialize)]
struct GrantBody<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: GrantType,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    redirect_uri: &'a str,
}

/// OAuth errors add a `hint` next to the usual problem fields.
#[derive(Deserialize)]
struct OAuthProblem {
    #[serde(flatten)]
    problem: ProblemDetails,
    #[serde(default)]
    hint: Option<String>,
}

/// [`GrantClient`] backed by the provider's token endpoint
pub struct OAuthGrantClient {
    http: HttpClient,
    token_url: Url,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthGrantClient {
    /// # Errors
    /// Returns `AmoError::InvalidInput` if `base_url` cannot be joined with
    /// the token endpoint path.
    pub fn new(
        http: HttpClient,
        base_url: &Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            http,
            token_url: base_url.join(TOKEN_ENDPOINT_PATH)?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        })
    }

    /// # Errors
    /// Returns `AmoError::Config` if the configured base URL is invalid.
    pub fn from_config(http: HttpClient, config: &AmoConfig) -> Result<Self> {
        let base_url = config.resolved_base_url()?;
        Self::new(
            http,
            &base_url,
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
        )
    }

    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    fn body<'a>(&'a self, request: &'a GrantRequest) -> GrantBody<'a> {
        let (code, refresh_token) = match request {
            GrantRequest::AuthorizationCode { code } => (Some(code.as_str()), None),
            GrantRequest::RefreshToken { refresh_token } => (None, Some(refresh_token.as_str())),
        };
        GrantBody {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: request.grant_type(),
            code,
            refresh_token,
            redirect_uri: &self.redirect_uri,
        }
    }
}

#[async_trait]
impl GrantClient for OAuthGrantClient {
    #[instrument(skip_all, fields(grant_type = %request.grant_type()))]
    async fn exchange(&self, request: &GrantRequest) -> Result<TokenGrant> {
        let builder = self
            .http
            .request(Method::POST, self.token_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&self.body(request));

        let response = self.http.send(builder).await?;
        let status = response.status();
        let text = response.text().await.map_err(into_domain)?;

        if status.is_success() {
            debug!(%status, "token grant succeeded");
            return serde_json::from_str::<TokenGrant>(&text)
                .map_err(|e| AmoError::Decode(format!("invalid token response: {e}")));
        }

        let message = rejection_message(&text);
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            warn!(%status, %message, "token endpoint rejected the grant");
            Err(AmoError::Auth(format!("token endpoint returned {status}: {message}")))
        } else {
            warn!(%status, %message, "token endpoint failed");
            Err(AmoError::api(status.as_u16(), message))
        }
    }
}

fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<OAuthProblem>(body) {
        Ok(OAuthProblem { problem, hint: Some(hint) }) if !hint.is_empty() => {
            format!("{} ({hint})", problem.compose_message())
        }
        Ok(OAuthProblem { problem, .. }) => problem.compose_message(),
        Err(_) => {
            debug!(body = %body_snippet(body), "token endpoint error body is not JSON");
            "unreadable error body".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthGrantClient {
        OAuthGrantClient::new(
            HttpClient::new().unwrap(),
            &Url::parse("https://example.amocrm.ru").unwrap(),
            "client-id",
            "client-secret",
            "https://app.test/callback",
        )
        .unwrap()
    }

    #[test]
    fn refresh_body_omits_code() {
        let client = client();
        let request = GrantRequest::RefreshToken { refresh_token: "r-1".into() };
        let body = serde_json::to_value(client.body(&request)).unwrap();

        assert_eq!(body["grant_type"], "refresh_token");
        assert_eq!(body["refresh_token"], "r-1");
        assert_eq!(body["redirect_uri"], "https://app.test/callback");
        assert!(body.get("code").is_none());
    }

    #[test]
    fn code_body_omits_refresh_token() {
        let client = client();
        let request = GrantRequest::AuthorizationCode { code: "c-1".into() };
        let body = serde_json::to_value(client.body(&request)).unwrap();

        assert_eq!(body["grant_type"], "authorization_code");
        assert_eq!(body["code"], "c-1");
        assert_eq!(body["client_id"], "client-id");
        assert!(body.get("refresh_token").is_none());
    }

    #[test]
    fn token_url_is_joined_to_origin() {
        assert_eq!(client().token_url().as_str(), "https://example.amocrm.ru/oauth2/access_token");
    }

    #[test]
    fn rejection_message_includes_hint() {
        let body = r#"{"hint":"Token has been revoked","title":"Invalid request","type":"x","status":400,"detail":"bad"}"#;
        let message = rejection_message(body);
        assert!(message.contains("Invalid request: bad"));
        assert!(message.contains("Token has been revoked"));
        assert_eq!(rejection_message("<html>"), "unreadable error body");
    }
}
