use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use url::Url;

use crate::config::Config;
use crate::error::{GENERIC_API_ERROR, LookupError};
use crate::media::{DescriptionSize, MediaRecord, MediaType, SearchResponse};

/// Parameters for a lookup by identifier or title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchParams {
    pub media_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub media_type: Option<MediaType>,
    pub description_size: DescriptionSize,
}

impl FetchParams {
    pub fn by_id(media_id: impl Into<String>) -> Self {
        Self {
            media_id: Some(media_id.into()),
            ..Default::default()
        }
    }

    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn with_description(mut self, size: DescriptionSize) -> Self {
        self.description_size = size;
        self
    }
}

/// Parameters for a search by title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub title: String,
    pub year: Option<String>,
    pub media_type: Option<MediaType>,
    pub page: Option<u32>,
}

impl SearchParams {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_type(mut self, media_type: Option<MediaType>) -> Self {
        self.media_type = media_type;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Read-only access to the remote media lookup API
#[async_trait]
pub trait MediaLookup: Send + Sync + Debug {
    /// Fetch one record by identifier or, failing that, by exact title
    async fn fetch(&self, params: &FetchParams) -> Result<MediaRecord, LookupError>;

    /// Search records whose title matches
    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, LookupError>;
}

/// HTTP client for an OMDb-compatible lookup API
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl OmdbClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(&config.api_url)
            .with_context(|| format!("Invalid API URL: {}", config.api_url))?;

        let api_key = config.api_key.clone().unwrap_or_else(|| {
            tracing::warn!("No API key configured; requests will likely be rejected");
            String::new()
        });

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn fetch_url(&self, params: &FetchParams) -> Result<Url, LookupError> {
        build_fetch_url(&self.base_url, &self.api_key, params)
    }

    pub fn search_url(&self, params: &SearchParams) -> Url {
        build_search_url(&self.base_url, &self.api_key, params)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, LookupError> {
        tracing::debug!("GET {}", redact_key(&url));

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Lookup request failed: {}", e);
                LookupError::Transport(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

#[async_trait]
impl MediaLookup for OmdbClient {
    async fn fetch(&self, params: &FetchParams) -> Result<MediaRecord, LookupError> {
        let url = self.fetch_url(params)?;
        self.get(url).await
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, LookupError> {
        let url = self.search_url(params);
        self.get(url).await
    }
}

/// Build the request URL for a lookup by identifier or title
///
/// The identifier wins when both are given. Fails before any request when
/// neither is present.
pub fn build_fetch_url(
    base: &Url,
    api_key: &str,
    params: &FetchParams,
) -> Result<Url, LookupError> {
    let identifier = match (non_empty(&params.media_id), non_empty(&params.title)) {
        (Some(id), _) => ("i", id),
        (None, Some(title)) => ("t", title),
        (None, None) => return Err(LookupError::MissingIdentifier),
    };

    let mut url = root_url(base);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair(identifier.0, identifier.1);
        if let Some(year) = non_empty(&params.year) {
            query.append_pair("y", year);
        }
        if let Some(media_type) = params.media_type {
            query.append_pair("type", media_type.as_str());
        }
        query.append_pair("plot", params.description_size.as_str());
        query.append_pair("apikey", api_key);
    }
    Ok(url)
}

/// Build the request URL for a title search
pub fn build_search_url(
    base: &Url,
    api_key: &str,
    params: &SearchParams,
) -> Url {
    let mut url = root_url(base);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("s", &params.title);
        if let Some(year) = non_empty(&params.year) {
            query.append_pair("y", year);
        }
        if let Some(media_type) = params.media_type {
            query.append_pair("type", media_type.as_str());
        }
        if let Some(page) = params.page {
            query.append_pair("page", &page.to_string());
        }
        query.append_pair("apikey", api_key);
    }
    url
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Turn a status code and body into a decoded payload or a lookup error
///
/// A success status with an in-band failure payload decodes normally.
pub fn decode_response<T: serde::de::DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, LookupError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
        tracing::warn!("Lookup API returned status {}: {}", status, message);
        return Err(LookupError::Http { status, message });
    }

    Ok(serde_json::from_str(body)?)
}

// Requests always target "<base>/"
fn root_url(base: &Url) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
