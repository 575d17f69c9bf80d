//! Movie record model and derivation rules.
//!
//! Defines [`MovieRecord`] (the on-disk and on-wire shape of one catalog
//! entry), the [`Era`] classification derived from the release year, and the
//! request shapes for creating and patching records.
//!
//! Field names on the wire are a compatibility contract with existing stored
//! snapshots and API consumers; do not rename them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Era classification derived from the release year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    Silent,
    Golden,
    Classic,
    Modern,
    Contemporary,
}

impl Era {
    /// Classify a release year into an era.
    ///
    /// Total over all integers; boundaries are first-match, lower bound
    /// inclusive: <1930 silent, <1960 golden, <1980 classic, <2000 modern,
    /// everything else contemporary.
    pub fn from_year(year: i32) -> Self {
        if year < 1930 {
            Era::Silent
        } else if year < 1960 {
            Era::Golden
        } else if year < 1980 {
            Era::Classic
        } else if year < 2000 {
            Era::Modern
        } else {
            Era::Contemporary
        }
    }
}

/// A single catalog entry.
///
/// Serialized both into the snapshot file and API responses with the exact
/// field names listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: Uuid,
    #[serde(rename = "collectionType")]
    pub collection_type: String,
    pub era: Era,
    #[serde(rename = "dateAdded")]
    pub date_added: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub genre: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbId", default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "audioQuality", default, skip_serializing_if = "Option::is_none")]
    pub audio_quality: Option<String>,
    #[serde(rename = "purchasedAt", default, skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<String>,
    #[serde(default)]
    pub watched: bool,
}

/// Discriminator tag for movie records. Single-valued today; kept on every
/// record for forward extension to other media types.
pub const COLLECTION_TYPE_MOVIE: &str = "movie";

/// Request body for manually adding a record.
///
/// `title`, `year` and `genre` are required (genre may be an empty list but
/// must be present); everything else is optional with defaults applied at
/// construction time.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntry {
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub director: Option<String>,
    pub genre: Vec<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(rename = "audioQuality", default)]
    pub audio_quality: Option<String>,
    #[serde(rename = "purchasedAt", default)]
    pub purchased_at: Option<String>,
    #[serde(default)]
    pub watched: Option<bool>,
}

/// User-supplied override fields accompanying an external-fetch request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalOverrides {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(rename = "audioQuality", default)]
    pub audio_quality: Option<String>,
    #[serde(rename = "purchasedAt", default)]
    pub purchased_at: Option<String>,
    #[serde(default)]
    pub watched: Option<bool>,
}

/// Per-field patch for updating a record.
///
/// A field left out of the request body (or sent as JSON null) deserializes
/// to `None` and is not touched; only `Some` fields overwrite the stored
/// value. `id`, `collectionType`, `era` and `dateAdded` are immutable and
/// deliberately absent here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbId", default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(rename = "audioQuality", default)]
    pub audio_quality: Option<String>,
    #[serde(rename = "purchasedAt", default)]
    pub purchased_at: Option<String>,
    #[serde(default)]
    pub watched: Option<bool>,
}

impl MovieRecord {
    /// Build a record from a manual entry, assigning a fresh id, deriving the
    /// era from the entry's year and stamping the creation time.
    pub fn from_manual(entry: ManualEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection_type: COLLECTION_TYPE_MOVIE.to_string(),
            era: Era::from_year(entry.year),
            date_added: Utc::now(),
            title: entry.title,
            year: entry.year,
            director: entry.director.unwrap_or_else(|| "Unknown".to_string()),
            genre: entry.genre,
            plot: entry.plot,
            runtime: entry.runtime,
            image_url: entry.image_url,
            imdb_rating: None,
            imdb_id: None,
            rating: entry.rating,
            notes: entry.notes,
            tags: entry.tags.unwrap_or_default(),
            format: entry.format,
            audio_quality: entry.audio_quality,
            purchased_at: entry.purchased_at,
            watched: entry.watched.unwrap_or(false),
        }
    }

    /// Apply a shallow per-field patch. Fields that are `None` in the patch
    /// are left untouched; `era` and `dateAdded` are never recomputed.
    pub fn apply_patch(&mut self, patch: RecordPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(director) = patch.director {
            self.director = director;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(plot) = patch.plot {
            self.plot = Some(plot);
        }
        if let Some(runtime) = patch.runtime {
            self.runtime = Some(runtime);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(imdb_rating) = patch.imdb_rating {
            self.imdb_rating = Some(imdb_rating);
        }
        if let Some(imdb_id) = patch.imdb_id {
            self.imdb_id = Some(imdb_id);
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(format) = patch.format {
            self.format = Some(format);
        }
        if let Some(audio_quality) = patch.audio_quality {
            self.audio_quality = Some(audio_quality);
        }
        if let Some(purchased_at) = patch.purchased_at {
            self.purchased_at = Some(purchased_at);
        }
        if let Some(watched) = patch.watched {
            self.watched = watched;
        }
    }

    /// Case-insensitive substring match against title, director, imdbId and
    /// every genre/tag element. An empty query matches everything.
    pub fn matches_query(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.director.to_lowercase().contains(query_lower)
            || self
                .imdb_id
                .as_deref()
                .is_some_and(|id| id.to_lowercase().contains(query_lower))
            || self
                .genre
                .iter()
                .any(|g| g.to_lowercase().contains(query_lower))
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(query_lower))
    }
}
