use std::fmt;

use async_trait::async_trait;
use kakijun_config::api::ApiConfig;
use kakijun_types::ResultPayload;
use reqwest::Url;
use serde::Deserialize;

use crate::error::ApiError;

/// Lookup route on the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /api/kanji/{char}`, a single result object
    ExactMatch(char),
    /// `GET /api/search/kanji?query={text}`, a list of results
    Search(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::ExactMatch(c) => write!(f, "/api/kanji/{c}"),
            Endpoint::Search(query) => write!(f, "/api/search/kanji?query={query}"),
        }
    }
}

/// Kanji backend interface
#[async_trait]
pub trait KanjiApi: Send + Sync {
    /// Query a lookup route and normalize the body to a list of results
    async fn lookup(&self, endpoint: &Endpoint) -> Result<ResultPayload, ApiError>;

    /// Raw SVG text of a stroke diagram asset
    async fn fetch_svg(&self, filename: &str) -> Result<String, ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HttpKanjiApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpKanjiApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| ApiError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "not a base URL".into(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a lookup route, path and query percent-encoded
    pub fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        match endpoint {
            Endpoint::ExactMatch(c) => self.join(&["api", "kanji", &c.to_string()]),
            Endpoint::Search(query) => {
                let mut url = self.join(&["api", "search", "kanji"])?;
                url.query_pairs_mut().append_pair("query", query);
                Ok(url)
            }
        }
    }

    pub fn svg_url(&self, filename: &str) -> Result<Url, ApiError> {
        self.join(&["data", "svgs", filename])
    }

    fn join(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base URL".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());

        tracing::debug!("Request failed with {}: {:?}", status, message);
        Err(ApiError::Status { status, message })
    }
}

#[async_trait]
impl KanjiApi for HttpKanjiApi {
    async fn lookup(&self, endpoint: &Endpoint) -> Result<ResultPayload, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        let body = self.get(url).await?.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;

        Ok(ResultPayload::from_json(value))
    }

    async fn fetch_svg(&self, filename: &str) -> Result<String, ApiError> {
        let url = self.svg_url(filename)?;
        Ok(self.get(url).await?.text().await?)
    }
}
