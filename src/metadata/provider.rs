//! Trait definition and types for metadata providers.
//!
//! This module defines the [`MetadataProvider`] trait that external film
//! database backends must implement, along with the normalized shapes
//! returned by provider queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single lightweight result from a provider title search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Provider-specific identifier for this title (e.g. an IMDb id).
    #[serde(rename = "imdbId")]
    pub external_id: String,
    /// Display title.
    pub title: String,
    /// Release year as reported by the provider (kept verbatim; providers
    /// use ranges like "1994-1998" for series).
    pub year: Option<String>,
    /// Media type as reported by the provider (e.g. "movie").
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,
    /// Poster URL, absent when the provider has no artwork.
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Full detail payload for one externally identified title, already
/// normalized: placeholder sentinels mapped to `None`, the comma-delimited
/// genre string split into trimmed tags, and the year parsed to an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDetail {
    pub external_id: String,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub genres: Vec<String>,
    pub plot: Option<String>,
    pub runtime: Option<String>,
    /// Provider-reported audience rating, kept as the provider's string.
    pub external_rating: Option<String>,
    pub image_url: Option<String>,
}

/// Async trait wrapping one external title-metadata source.
///
/// Implementations are expected to be wrapped in an `Arc` and shared across
/// request handlers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"omdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has been configured with credentials
    /// and is ready to serve requests.
    fn is_available(&self) -> bool;

    /// Search for titles matching `query` on the given 1-based page.
    ///
    /// Returns an empty list when the provider reports no matches. Transport
    /// and provider-side failures propagate as errors.
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchHit>>;

    /// Fetch the full detail payload for one external id.
    ///
    /// `Ok(None)` is the provider's own "not found" answer, distinct from a
    /// transport failure which surfaces as `Err`.
    async fn fetch_by_id(&self, external_id: &str) -> Result<Option<ExternalDetail>>;
}
