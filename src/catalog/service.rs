//! Collection service: orchestrates all catalog operations.
//!
//! Every operation loads the full snapshot, applies itself in memory and,
//! for writes, persists the whole snapshot back. Writes serialize behind a
//! single lock so overlapping requests cannot lose updates; reads load
//! without it, which is safe because saves replace the snapshot atomically.
//! Provider fetches run outside the critical section.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::catalog::record::{
    Era, ExternalOverrides, ManualEntry, MovieRecord, RecordPatch, COLLECTION_TYPE_MOVIE,
};
use crate::catalog::store::SnapshotStore;
use crate::error::{Error, Result};
use crate::metadata::{ExternalDetail, MetadataProvider};

pub struct CatalogService {
    store: SnapshotStore,
    provider: Arc<dyn MetadataProvider>,
    write_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(store: SnapshotStore, provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            store,
            provider,
            write_lock: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }

    /// All records in storage order.
    pub fn list(&self) -> Vec<MovieRecord> {
        self.store.load()
    }

    /// Look up one record by id.
    pub fn get(&self, id: Uuid) -> Result<MovieRecord> {
        self.store
            .load()
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::not_found(format!("movie {id}")))
    }

    /// Case-insensitive substring search over title, director, imdbId and
    /// every genre/tag element, preserving storage order.
    pub fn search(&self, query: &str) -> Vec<MovieRecord> {
        let query = query.to_lowercase();
        self.store
            .load()
            .into_iter()
            .filter(|m| m.matches_query(&query))
            .collect()
    }

    /// Add a manually entered record.
    pub async fn create_manual(&self, entry: ManualEntry) -> Result<MovieRecord> {
        if entry.title.trim().is_empty() {
            return Err(Error::validation("title cannot be empty"));
        }

        let record = MovieRecord::from_manual(entry);

        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load();
        records.push(record.clone());
        self.store.save(&records)?;

        info!(id = %record.id, title = %record.title, "added manual record");
        Ok(record)
    }

    /// Add a record enriched from the external provider, idempotently keyed
    /// on the external id.
    ///
    /// If a record with this `imdbId` already exists it is returned as-is:
    /// no fetch, no write. Otherwise the provider is consulted (outside the
    /// write lock); a provider "not found" surfaces as [`Error::NotFound`]
    /// with the snapshot untouched.
    pub async fn create_or_fetch_external(
        &self,
        external_id: &str,
        overrides: ExternalOverrides,
    ) -> Result<MovieRecord> {
        if let Some(existing) = self.find_by_external_id(external_id) {
            info!(%external_id, id = %existing.id, "external id already in collection");
            return Ok(existing);
        }

        let detail = self
            .provider
            .fetch_by_id(external_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("{external_id} on {}", self.provider.name())))?;

        let record = merge_external(detail, overrides);

        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load();
        // The fetch ran outside the lock; a concurrent request for the same
        // id may have won the race, in which case its record stands.
        if let Some(existing) = records.iter().find(|m| m.imdb_id.as_deref() == Some(external_id)) {
            return Ok(existing.clone());
        }
        records.push(record.clone());
        self.store.save(&records)?;

        info!(id = %record.id, title = %record.title, %external_id, "added record from provider");
        Ok(record)
    }

    /// Shallow per-field update. Fields absent from the patch are left
    /// untouched; `era` and `dateAdded` are never recomputed.
    pub async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<MovieRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load();

        let record = records
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::not_found(format!("movie {id}")))?;

        record.apply_patch(patch);
        let updated = record.clone();
        self.store.save(&records)?;

        info!(%id, "updated record");
        Ok(updated)
    }

    /// Remove a record. The snapshot is only rewritten when something was
    /// actually removed.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load();

        let len_before = records.len();
        records.retain(|m| m.id != id);
        if records.len() == len_before {
            return Err(Error::not_found(format!("movie {id}")));
        }

        self.store.save(&records)?;
        info!(%id, "deleted record");
        Ok(())
    }

    fn find_by_external_id(&self, external_id: &str) -> Option<MovieRecord> {
        self.store
            .load()
            .into_iter()
            .find(|m| m.imdb_id.as_deref() == Some(external_id))
    }
}

/// Construct a new record from provider metadata merged with the caller's
/// override fields, assigning a fresh id and deriving era from the
/// provider-reported year.
fn merge_external(detail: ExternalDetail, overrides: ExternalOverrides) -> MovieRecord {
    MovieRecord {
        id: Uuid::new_v4(),
        collection_type: COLLECTION_TYPE_MOVIE.to_string(),
        era: Era::from_year(detail.year),
        date_added: Utc::now(),
        title: detail.title,
        year: detail.year,
        director: detail.director,
        genre: detail.genres,
        plot: detail.plot,
        runtime: detail.runtime,
        image_url: detail.image_url,
        imdb_rating: detail.external_rating,
        imdb_id: Some(detail.external_id),
        rating: overrides.rating,
        notes: overrides.notes,
        tags: overrides.tags.unwrap_or_default(),
        format: overrides.format,
        audio_quality: overrides.audio_quality,
        purchased_at: overrides.purchased_at,
        watched: overrides.watched.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider stub returning a canned detail payload and counting fetches.
    struct StubProvider {
        detail: Option<ExternalDetail>,
        fetches: AtomicUsize,
        fail: bool,
    }

    impl StubProvider {
        fn found(detail: ExternalDetail) -> Self {
            Self {
                detail: Some(detail),
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn not_found() -> Self {
            Self {
                detail: None,
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                detail: None,
                fetches: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn search(&self, _query: &str, _page: u32) -> Result<Vec<crate::metadata::SearchHit>> {
            Ok(Vec::new())
        }

        async fn fetch_by_id(&self, _external_id: &str) -> Result<Option<ExternalDetail>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::provider("stub transport failure"));
            }
            Ok(self.detail.clone())
        }
    }

    fn detail(id: &str) -> ExternalDetail {
        ExternalDetail {
            external_id: id.to_string(),
            title: "The Matrix".to_string(),
            year: 1999,
            director: "The Wachowskis".to_string(),
            genres: vec!["Action".to_string(), "Sci-Fi".to_string()],
            plot: Some("A hacker learns the truth.".to_string()),
            runtime: Some("136 min".to_string()),
            external_rating: Some("8.7".to_string()),
            image_url: Some("http://img/matrix.jpg".to_string()),
        }
    }

    fn manual(title: &str, year: i32) -> ManualEntry {
        ManualEntry {
            title: title.to_string(),
            year,
            director: Some("D".to_string()),
            genre: vec!["Drama".to_string()],
            plot: None,
            runtime: None,
            image_url: None,
            rating: None,
            tags: None,
            notes: None,
            format: None,
            audio_quality: None,
            purchased_at: None,
            watched: None,
        }
    }

    fn service_with(provider: Arc<dyn MetadataProvider>) -> (CatalogService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("movies.json"));
        (CatalogService::new(store, provider), dir)
    }

    #[tokio::test]
    async fn manual_create_get_delete_flow() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));

        let created = service.create_manual(manual("X", 1975)).await.unwrap();
        assert_eq!(created.era, Era::Classic);
        assert!(!created.watched);
        assert!(created.tags.is_empty());

        let fetched = service.get(created.id).unwrap();
        assert_eq!(fetched, created);

        service.delete(created.id).await.unwrap();
        assert_matches!(service.get(created.id), Err(Error::NotFound(_)));
    }

    #[tokio::test]
    async fn manual_create_rejects_empty_title() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));
        let err = service.create_manual(manual("   ", 1975)).await.unwrap_err();
        assert_matches!(err, Error::Validation(_));
        assert!(service.list().is_empty());
    }

    #[tokio::test]
    async fn external_create_merges_provider_and_overrides() {
        let (service, _dir) = service_with(Arc::new(StubProvider::found(detail("tt0133093"))));

        let overrides = ExternalOverrides {
            rating: Some(9.5),
            tags: Some(vec!["favorite".to_string()]),
            notes: Some("rewatch soon".to_string()),
            format: Some("4K UHD".to_string()),
            audio_quality: None,
            purchased_at: None,
            watched: Some(true),
        };

        let record = service
            .create_or_fetch_external("tt0133093", overrides)
            .await
            .unwrap();

        assert_eq!(record.title, "The Matrix");
        assert_eq!(record.year, 1999);
        assert_eq!(record.era, Era::Modern);
        assert_eq!(record.imdb_id.as_deref(), Some("tt0133093"));
        assert_eq!(record.imdb_rating.as_deref(), Some("8.7"));
        assert_eq!(record.genre, vec!["Action", "Sci-Fi"]);
        assert_eq!(record.rating, Some(9.5));
        assert_eq!(record.tags, vec!["favorite"]);
        assert_eq!(record.format.as_deref(), Some("4K UHD"));
        assert!(record.watched);
    }

    #[tokio::test]
    async fn external_create_is_idempotent() {
        let provider = Arc::new(StubProvider::found(detail("tt0133093")));
        let (service, _dir) = service_with(provider.clone());

        let first = service
            .create_or_fetch_external("tt0133093", ExternalOverrides::default())
            .await
            .unwrap();
        let second = service
            .create_or_fetch_external("tt0133093", ExternalOverrides::default())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(service.list().len(), 1);
        // The second call short-circuits before reaching the provider.
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn external_not_found_leaves_snapshot_untouched() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));

        let err = service
            .create_or_fetch_external("tt0000000", ExternalOverrides::default())
            .await
            .unwrap_err();
        assert_matches!(err, Error::NotFound(_));
        assert!(service.list().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let (service, _dir) = service_with(Arc::new(StubProvider::failing()));

        let err = service
            .create_or_fetch_external("tt0133093", ExternalOverrides::default())
            .await
            .unwrap_err();
        assert_matches!(err, Error::Provider(_));
        assert!(service.list().is_empty());
    }

    #[tokio::test]
    async fn manual_entries_are_not_deduplicated() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));

        service.create_manual(manual("Same", 1980)).await.unwrap();
        service.create_manual(manual("Same", 1980)).await.unwrap();
        assert_eq!(service.list().len(), 2);
    }

    #[tokio::test]
    async fn update_changes_only_patched_fields() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));
        let created = service.create_manual(manual("Old", 1975)).await.unwrap();

        let updated = service
            .update(
                created.id,
                RecordPatch {
                    title: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.era, created.era);
        assert_eq!(updated.date_added, created.date_added);
        assert_eq!(updated.director, created.director);

        // The change is durable.
        let reloaded = service.get(created.id).unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));
        let err = service
            .update(Uuid::new_v4(), RecordPatch::default())
            .await
            .unwrap_err();
        assert_matches!(err, Error::NotFound(_));
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_collection_unchanged() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));
        service.create_manual(manual("Keep", 1990)).await.unwrap();

        let err = service.delete(Uuid::new_v4()).await.unwrap_err();
        assert_matches!(err, Error::NotFound(_));
        assert_eq!(service.list().len(), 1);
    }

    #[tokio::test]
    async fn search_matches_genre_and_director_substrings() {
        let (service, _dir) = service_with(Arc::new(StubProvider::not_found()));

        service.create_manual(manual("A", 1970)).await.unwrap();
        let mut by_director = manual("B", 1980);
        by_director.director = Some("Dramatic Dan".to_string());
        by_director.genre = vec!["Comedy".to_string()];
        service.create_manual(by_director).await.unwrap();

        // Matches genre ["Drama"] on the first and the director substring on
        // the second, case-insensitively.
        let hits = service.search("drama");
        assert_eq!(hits.len(), 2);

        let hits = service.search("comedy");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "B");

        // Empty query matches everything, in storage order.
        let all = service.search("");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "A");
    }
}
