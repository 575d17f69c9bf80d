//! OMDb metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the OMDb REST API. OMDb
//! reports "no results" / "not found" in-band via `"Response": "False"`
//! rather than HTTP status codes, and uses the literal string `"N/A"` as an
//! absent-value sentinel; both quirks are normalized away here so callers
//! only see the adapter's clean shapes.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::provider::{ExternalDetail, MetadataProvider, SearchHit};

pub const OMDB_BASE_URL: &str = "https://www.omdbapi.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// OMDb API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchResult>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResult {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type")]
    media_type: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// OMDb metadata provider.
pub struct OmdbProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbProvider {
    /// Create a provider against the public OMDb endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OMDB_BASE_URL.to_string())
    }

    /// Create a provider against a custom endpoint (used by tests to point
    /// at a local mock server).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key,
            base_url,
        }
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut url = format!("{}/?apikey={}", self.base_url, self.api_key);
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::provider(format!("OMDb request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::provider(format!("OMDb returned error status: {e}")))?;

        Ok(resp)
    }
}

/// Map OMDb's literal `"N/A"` sentinel to an absent value.
fn not_na(value: Option<String>) -> Option<String> {
    value.filter(|v| v != "N/A")
}

/// Split OMDb's comma-delimited genre string into trimmed tags.
fn split_genres(genre: Option<&str>) -> Vec<String> {
    match genre {
        Some(g) if !g.is_empty() && g != "N/A" => {
            g.split(',').map(|s| s.trim().to_string()).collect()
        }
        _ => Vec::new(),
    }
}

/// Parse a year from OMDb's `Year` field, which may be a plain year or a
/// range like `"1994-1998"`; the leading four digits win.
fn parse_year(year: Option<&str>) -> i32 {
    year.and_then(|y| y.get(..4))
        .and_then(|y| y.parse::<i32>().ok())
        .unwrap_or(0)
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

#[async_trait]
impl MetadataProvider for OmdbProvider {
    fn name(&self) -> &'static str {
        "omdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchHit>> {
        let page_str = page.to_string();
        debug!(query, page, "OMDb title search");

        let body: OmdbSearchResponse = self
            .get(&[("s", query), ("type", "movie"), ("page", &page_str)])
            .await?
            .json()
            .await
            .map_err(|e| Error::provider(format!("failed to parse OMDb search response: {e}")))?;

        if body.response == "False" {
            return Ok(Vec::new());
        }

        Ok(body
            .search
            .into_iter()
            .map(|r| SearchHit {
                external_id: r.imdb_id,
                title: r.title,
                year: not_na(r.year),
                media_type: r.media_type,
                image_url: not_na(r.poster),
            })
            .collect())
    }

    async fn fetch_by_id(&self, external_id: &str) -> Result<Option<ExternalDetail>> {
        debug!(external_id, "OMDb fetch by id");

        let body: OmdbDetailResponse = self
            .get(&[("i", external_id), ("plot", "full")])
            .await?
            .json()
            .await
            .map_err(|e| Error::provider(format!("failed to parse OMDb detail response: {e}")))?;

        if body.response == "False" {
            return Ok(None);
        }

        Ok(Some(ExternalDetail {
            external_id: body.imdb_id.unwrap_or_else(|| external_id.to_string()),
            title: body.title.unwrap_or_default(),
            year: parse_year(body.year.as_deref()),
            director: body.director.unwrap_or_else(|| "Unknown".to_string()),
            genres: split_genres(body.genre.as_deref()),
            plot: body.plot,
            runtime: body.runtime,
            external_rating: body.imdb_rating,
            image_url: not_na(body.poster),
        }))
    }
}
