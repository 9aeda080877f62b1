//! # Access Tokens
//!
//! Bearer tokens for the Google adapter. A service account signs an RS256
//! JWT assertion and trades it at the OAuth token endpoint; the resulting
//! token is reused until a minute before it expires.

use async_trait::async_trait;
use chrono::Utc;
use eyre::{Result, WrapErr};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::Serialize;
use slotsync_core::errors::{SchedulerError, SchedulerResult};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::{
    config::{CALENDAR_SCOPE, ServiceAccountCredentials},
    models::GoogleTokenResponse,
};

const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Provides bearer tokens for calendar API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> SchedulerResult<String>;
}

/// A fixed token, e.g. one minted out of band.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> SchedulerResult<String> {
        Ok(self.0.clone())
    }
}

/// Stands in when no credentials are configured; every call fails.
pub struct MissingCredentials;

#[async_trait]
impl AccessTokenProvider for MissingCredentials {
    async fn access_token(&self) -> SchedulerResult<String> {
        Err(SchedulerError::upstream("Missing Google service account credentials"))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
}

struct CachedToken {
    token: String,
    refresh_after: Instant,
}

pub struct ServiceAccountTokenProvider {
    client: Client,
    client_email: String,
    impersonated_user: Option<String>,
    signing_key: EncodingKey,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(
        client: Client,
        credentials: &ServiceAccountCredentials,
        token_uri: &str,
    ) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .wrap_err("GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY is not a valid RSA PEM key")?;

        Ok(Self {
            client,
            client_email: credentials.client_email.clone(),
            impersonated_user: credentials.impersonated_user.clone(),
            signing_key,
            token_uri: token_uri.to_string(),
            cached: Mutex::new(None),
        })
    }

    fn assertion(&self) -> SchedulerResult<String> {
        let issued_at = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
            sub: self.impersonated_user.as_deref(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key).map_err(|e| {
            error!("failed to sign service account assertion: {}", e);
            SchedulerError::upstream("Could not sign service account assertion")
        })
    }

    async fn fetch(&self) -> SchedulerResult<CachedToken> {
        let assertion = self.assertion()?;
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("token request failed: {}", e);
                SchedulerError::upstream("Token request failed")
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "token endpoint rejected service account");
            return Err(SchedulerError::upstream(format!("Token endpoint returned {status}")));
        }

        let token: GoogleTokenResponse = response.json().await.map_err(|e| {
            error!("unreadable token response: {}", e);
            SchedulerError::upstream("Unreadable token response")
        })?;

        debug!(expires_in = token.expires_in, "obtained calendar access token");
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        Ok(CachedToken {
            token: token.access_token,
            refresh_after: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> SchedulerResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_after) {
            return Ok(token.token.clone());
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
