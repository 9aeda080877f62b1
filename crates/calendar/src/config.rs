//! # Google Calendar Configuration
//!
//! Environment variables:
//!
//! - `GOOGLE_SERVICE_ACCOUNT_EMAIL`: service account client email
//! - `GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY`: PEM private key; literal `\n`
//!   sequences are turned into newlines
//! - `GOOGLE_IMPERSONATED_USER`: optional domain-wide delegation subject
//! - `GOOGLE_ACCESS_TOKEN`: optional static bearer token, preferred over the
//!   service account when set
//! - `GOOGLE_CALENDAR_API_BASE`: API root (default Google's v3 endpoint)
//! - `GOOGLE_TOKEN_URI`: OAuth token endpoint
//! - `GOOGLE_HTTP_TIMEOUT_SECONDS`: per-call timeout (default 10)

use eyre::{Result, WrapErr};
use std::{env, time::Duration};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Service account identity used to mint access tokens.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub impersonated_user: Option<String>,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("impersonated_user", &self.impersonated_user)
            .finish()
    }
}

#[derive(Clone)]
pub struct GoogleCalendarConfig {
    pub api_base: String,
    pub token_uri: String,
    pub credentials: Option<ServiceAccountCredentials>,
    pub access_token: Option<String>,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for GoogleCalendarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCalendarConfig")
            .field("api_base", &self.api_base)
            .field("token_uri", &self.token_uri)
            .field("credentials", &self.credentials)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl GoogleCalendarConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| {
            var(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials = match (
            non_empty("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            non_empty("GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY"),
        ) {
            (Some(client_email), Some(private_key)) => Some(ServiceAccountCredentials {
                client_email,
                private_key: private_key.replace("\\n", "\n"),
                impersonated_user: non_empty("GOOGLE_IMPERSONATED_USER"),
            }),
            _ => None,
        };

        let http_timeout = non_empty("GOOGLE_HTTP_TIMEOUT_SECONDS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .wrap_err("Invalid GOOGLE_HTTP_TIMEOUT_SECONDS value")?
            .unwrap_or(10);

        Ok(Self {
            api_base: non_empty("GOOGLE_CALENDAR_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            token_uri: non_empty("GOOGLE_TOKEN_URI")
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            credentials,
            access_token: non_empty("GOOGLE_ACCESS_TOKEN"),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some() || self.access_token.is_some()
    }
}
