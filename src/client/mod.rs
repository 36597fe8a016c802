//! HTTP client for the sidecar service.
//!
//! Every call except [`Client::health`] posts JSON and unwraps the
//! `{data, metadata, error}` envelope. A service-reported error comes back
//! verbatim as [`ServiceError`]. Nothing is retried here.

mod envelope;
mod types;

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use envelope::{ResponseMetadata, ServiceError};
pub use types::{
    AnalyzeData, AnalyzeRequest, AnalyzeResponse, HealthResponse, RomanizeRequest,
    RomanizeResponse, SyllableTokenizeRequest, SyllableTokenizeResponse, TokenizeRequest,
    TokenizeResponse, TransliterateRequest, TransliterateResponse,
};

use crate::error::{Error, Result};
use envelope::Envelope;
use types::{RomanizeData, SyllableTokenizeData, TokenizeData, TransliterateData};

pub const HEALTH_PATH: &str = "/health";
pub const TOKENIZE_PATH: &str = "/tokenize";
pub const ROMANIZE_PATH: &str = "/romanize";
pub const TRANSLITERATE_PATH: &str = "/transliterate";
pub const SYLLABLE_TOKENIZE_PATH: &str = "/syllable_tokenize";
pub const ANALYZE_PATH: &str = "/analyze";

const MAX_IDLE_PER_HOST: usize = 10;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Client for one service instance. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Health and engine inventory.
    pub async fn health(&self) -> Result<HealthResponse> {
        let body = self.send(Method::GET, HEALTH_PATH, None::<&()>).await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            path: HEALTH_PATH,
            source,
        })
    }

    pub async fn tokenize(&self, req: &TokenizeRequest) -> Result<TokenizeResponse> {
        let (data, metadata): (TokenizeData, _) = self.call(TOKENIZE_PATH, req).await?;
        Ok(TokenizeResponse {
            tokens: data.tokens,
            metadata,
        })
    }

    pub async fn romanize(&self, req: &RomanizeRequest) -> Result<RomanizeResponse> {
        let (data, metadata): (RomanizeData, _) = self.call(ROMANIZE_PATH, req).await?;
        Ok(RomanizeResponse {
            romanized: data.romanized,
            tokens: data.tokens,
            romanized_tokens: data.romanized_tokens,
            metadata,
        })
    }

    pub async fn transliterate(&self, req: &TransliterateRequest) -> Result<TransliterateResponse> {
        let (data, metadata): (TransliterateData, _) =
            self.call(TRANSLITERATE_PATH, req).await?;
        Ok(TransliterateResponse {
            phonetic: data.phonetic,
            metadata,
        })
    }

    pub async fn syllable_tokenize(
        &self,
        req: &SyllableTokenizeRequest,
    ) -> Result<SyllableTokenizeResponse> {
        let (data, metadata): (SyllableTokenizeData, _) =
            self.call(SYLLABLE_TOKENIZE_PATH, req).await?;
        Ok(SyllableTokenizeResponse {
            syllables: data.syllables,
            metadata,
        })
    }

    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        let (data, metadata) = self.call(ANALYZE_PATH, req).await?;
        Ok(AnalyzeResponse { data, metadata })
    }

    /// POST `body` to `path` and unwrap the envelope into `T`.
    async fn call<B, T>(&self, path: &'static str, body: &B) -> Result<(T, ResponseMetadata)>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let bytes = self.send(Method::POST, path, Some(body)).await?;
        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|source| Error::Decode { path, source })?;

        if let Some(err) = envelope.error {
            tracing::debug!(path, code = %err.code, "Service returned error: {}", err.message);
            return Err(Error::Service(err));
        }

        let data = match envelope.data {
            Some(serde_json::Value::Null) | None => return Err(Error::MissingData { path }),
            Some(data) => data,
        };
        let data = serde_json::from_value(data).map_err(|source| Error::Decode { path, source })?;
        Ok((data, envelope.metadata))
    }

    /// Send a request and return the body. The status code is not checked:
    /// error replies carry their reason in the envelope.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &'static str,
        body: Option<&B>,
    ) -> Result<Vec<u8>> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| Error::Request { path, source })?;
        tracing::trace!(path, status = %response.status(), "Service responded");

        let bytes = response
            .bytes()
            .await
            .map_err(|source| Error::Request { path, source })?;
        Ok(bytes.to_vec())
    }
}
