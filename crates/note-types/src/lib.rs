//! # note-types
//!
//! Shared data model and configuration for the note-search daemon.
//!
//! This crate defines the record shape handed to the index engine, the
//! live-mutable runtime configuration shared between the lifecycle manager
//! and the query service, and layered startup configuration loading.

pub mod config;
pub mod error;
pub mod note;

pub use config::{
    shared_runtime, AppConfig, RuntimeConfig, RuntimeConfigPatch, SharedRuntimeConfig,
};
pub use error::ConfigError;
pub use note::NoteRecord;
