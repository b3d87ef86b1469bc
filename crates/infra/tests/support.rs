#![allow(dead_code)]

use std::sync::Arc;

use amocrm_core::AccessTokenProvider;
use amocrm_domain::{AccessToken, AmoConfig, Result};
use amocrm_infra::{HttpClient, HttpRequestExecutor};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use url::Url;
use wiremock::{MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-access-token";

/// Token provider that always hands out the same bearer token.
pub struct StaticToken(pub &'static str);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<AccessToken> {
        Ok(AccessToken::new(self.0))
    }
}

/// Executor aimed at the mock server, authenticated with [`TOKEN`].
pub fn executor(server: &MockServer) -> Arc<HttpRequestExecutor> {
    let base = Url::parse(&server.uri()).expect("mock server uri should parse");
    let http = HttpClient::new().expect("http client should build");
    Arc::new(HttpRequestExecutor::new(http, base, Arc::new(StaticToken(TOKEN))))
}

/// Valid configuration for an account hosted by the mock server.
pub fn config(server: &MockServer) -> AmoConfig {
    let mut config = AmoConfig::new(
        server.uri(),
        "client-id",
        "client-s3cr3t",
        "https://integration.test/callback",
    );
    config.app_name = "integration".into();
    config.http.timeout_secs = 5;
    config
}

/// Token endpoint success body.
pub fn grant_response(access: &str, refresh: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "token_type": "Bearer",
        "expires_in": expires_in,
        "access_token": access,
        "refresh_token": refresh,
    }))
}

/// One page of a list endpoint, with a `next` link when `next` is given.
pub fn list_page(
    server: &MockServer,
    resource: &str,
    page: u32,
    items: Value,
    next: Option<u32>,
) -> ResponseTemplate {
    let href = |p: u32| format!("{}/api/v4/{resource}?page={p}&limit=250", server.uri());
    let mut links = json!({ "self": { "href": href(page) } });
    if let Some(next) = next {
        links["next"] = json!({ "href": href(next) });
    }
    let mut embedded = Map::new();
    embedded.insert(resource.to_owned(), items);
    ResponseTemplate::new(200).set_body_json(json!({
        "_page": page,
        "_links": links,
        "_embedded": embedded,
    }))
}
