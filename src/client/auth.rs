//! Password-grant login against the calculation service.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::info;

use crate::config::{AuthConfig, ServiceConfig};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Logs in with the OAuth2 password grant and returns a client that sends the
/// bearer token on every request. Any failure here is fatal to the run; only
/// per-combination calculation errors are recoverable.
pub async fn login(service: &ServiceConfig, auth: &AuthConfig) -> Result<reqwest::Client> {
    let bootstrap = reqwest::Client::builder()
        .timeout(service.http_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let url = format!("{}/api/v1/auth/login", service.base_url.trim_end_matches('/'));
    let resp = bootstrap
        .post(&url)
        .form(&[
            ("grant_type", "password"),
            ("username", auth.username.as_str()),
            ("password", auth.password.as_str()),
        ])
        .send()
        .await
        .context("login request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("login rejected: HTTP {status}: {body}");
    }

    let token: TokenResponse = resp.json().await.context("malformed login response")?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("faultsweep/0.2"));
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
        .context("access token is not a valid header value")?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    let client = reqwest::Client::builder()
        .timeout(service.http_timeout())
        .default_headers(headers)
        .build()
        .context("failed to build authorized HTTP client")?;

    info!("authenticated against {}", service.base_url);
    Ok(client)
}
