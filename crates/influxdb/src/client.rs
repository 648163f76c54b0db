use async_trait::async_trait;
use prom2influx_core::constants::{INFLUX_PASSWORD_ENV, INFLUX_USER_ENV};
use prom2influx_core::line_protocol::encode_batch;
use prom2influx_core::{WriteBatch, env_non_empty};
use serde::Deserialize;

use crate::WriteSink;
use crate::error::SinkError;

/// Basic-auth credentials for the sink.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Reads `INFLUX_USER` / `INFLUX_PWD`. Returns `None` when no user is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let username = env_non_empty(INFLUX_USER_ENV)?;
        let password = env_non_empty(INFLUX_PASSWORD_ENV).unwrap_or_default();
        Some(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the InfluxDB 1.x `/write` endpoint.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl InfluxClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("prom2influx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned(), credentials })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WriteSink for InfluxClient {
    async fn write(&self, batch: &WriteBatch) -> Result<(), SinkError> {
        let body = encode_batch(batch);
        if body.is_empty() {
            tracing::debug!(database = %batch.database, "nothing to write after encoding");
            return Ok(());
        }

        let mut request = self
            .client
            .post(format!("{}/write", self.base_url))
            .query(&[("db", batch.database.as_str()), ("precision", batch.precision.as_str())])
            .body(body);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
        let message = serde_json::from_str::<ErrorBody>(&text).map_or(text, |b| b.error);
        Err(SinkError::HttpStatus { code: status.as_u16(), message })
    }
}
