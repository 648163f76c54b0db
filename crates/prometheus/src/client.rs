use std::collections::HashMap;

use async_trait::async_trait;
use chrono::SecondsFormat;
use prom2influx_core::QueryResponse;
use serde::de::DeserializeOwned;

use crate::api_types::{ApiResponse, QueryData};
use crate::error::SourceError;
use crate::{QueryRange, QuerySource};

/// Maximum error body length kept in error messages.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Client for the Prometheus HTTP API v1.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    client: reqwest::Client,
    base_url: String,
}

impl PrometheusClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("prom2influx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::ClientInit(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_owned() }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse<T>, SourceError> {
        let response =
            self.client.get(format!("{}{path}", self.base_url)).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error responses still carry the JSON envelope; prefer its message.
        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) if status.is_success() || envelope.status == "error" => Ok(envelope),
            Ok(_) => Err(SourceError::HttpStatus { code: status.as_u16(), body: truncate(&body) }),
            Err(_) if !status.is_success() => {
                Err(SourceError::HttpStatus { code: status.as_u16(), body: truncate(&body) })
            },
            Err(e) => Err(SourceError::JsonParse {
                context: format!("{path} response (body: {})", truncate(&body)),
                source: e,
            }),
        }
    }
}

#[async_trait]
impl QuerySource for PrometheusClient {
    async fn flags(&self) -> Result<HashMap<String, String>, SourceError> {
        let (flags, _) = self
            .get::<HashMap<String, String>>("/api/v1/status/flags", &[])
            .await?
            .into_data("flags")?;
        Ok(flags)
    }

    async fn query_range(&self, query: &str, range: QueryRange) -> Result<QueryResponse, SourceError> {
        let params = [
            ("query", query.to_owned()),
            ("start", range.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("end", range.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("step", range.step.as_secs_f64().to_string()),
        ];
        let (data, warnings) =
            self.get::<QueryData>("/api/v1/query_range", &params).await?.into_data("query_range")?;
        tracing::debug!(query, result_type = %data.result_type, "range query answered");
        Ok(QueryResponse { result: data.into_result()?, warnings })
    }
}

fn truncate(s: &str) -> String {
    if s.len() <= MAX_ERROR_BODY_LEN {
        return s.to_owned();
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while end > 0 && !s.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    s.get(..end).unwrap_or("").to_owned()
}
