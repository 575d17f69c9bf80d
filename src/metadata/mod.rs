//! External metadata lookup.
//!
//! The catalog enriches records from an external film database. The
//! [`provider::MetadataProvider`] trait is the seam; [`omdb`] is the one
//! production implementation.

pub mod omdb;
pub mod provider;

pub use omdb::OmdbProvider;
pub use provider::{ExternalDetail, MetadataProvider, SearchHit};
