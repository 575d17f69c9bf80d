//! ReelVault - personal movie collection catalog
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod error;
pub mod metadata;
pub mod server;

pub use error::{Error, Result};
