//! The collection record store and its enrichment/merge logic.

pub mod record;
pub mod service;
pub mod store;

pub use record::{Era, ExternalOverrides, ManualEntry, MovieRecord, RecordPatch};
pub use service::CatalogService;
pub use store::SnapshotStore;
