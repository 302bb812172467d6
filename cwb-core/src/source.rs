use std::{fmt::Debug, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::Config,
    error::{FetchError, SourceKind},
    region::Region,
};

pub mod astronomy;
pub mod forecast;
pub mod observation;

pub use astronomy::AstronomyClient;
pub use forecast::ForecastClient;
pub use observation::ObservationClient;

/// One remote dataset that yields a narrow, typed subset of fields.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait SourceClient: Send + Sync + Debug {
    type Fields: Send + 'static;

    fn kind(&self) -> SourceKind;

    async fn fetch(&self, region: &Region) -> Result<Self::Fields, FetchError>;
}

/// Authenticated access to the open-data datastore, shared by all three clients.
#[derive(Debug, Clone)]
pub struct CwbHttp {
    http: Client,
    base_url: String,
    api_key: String,
}

impl CwbHttp {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(http, base_url, api_key))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), api_key: api_key.into() }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.base_url.clone(), config.api_key()?, config.timeout())
    }

    /// GET `{base_url}/{dataset}` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        kind: SourceKind,
        dataset: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), dataset);
        debug!(source = %kind, url = %url, ?params, "Requesting dataset");

        let res = self
            .http
            .get(&url)
            .query(&[("Authorization", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::network(kind, format!("failed to send request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::network(kind, format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(FetchError::network(
                kind,
                format!("status {}: {}", status, truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed(kind, format!("unexpected JSON shape: {e}")))
    }
}

/// A scalar the datastore sends either as a JSON string or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub(crate) fn as_text(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }

    pub(crate) fn as_f64(&self, kind: SourceKind, name: &str) -> Result<f64, FetchError> {
        match self {
            RawValue::Number(n) => Ok(*n),
            RawValue::Text(s) => s.trim().parse().map_err(|_| {
                FetchError::malformed(kind, format!("value of `{name}` is not a number: {s:?}"))
            }),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
