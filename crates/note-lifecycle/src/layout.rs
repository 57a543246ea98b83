//! On-disk layout of index generations.
//!
//! One root directory holds at most three children: `active` (the
//! generation queries run against), `backup` (the previously active
//! generation, kept until the next successful swap), and `staging` (only
//! present while a build is in flight; renamed away on promotion).

use std::path::{Path, PathBuf};

/// Paths of the generation directories under one index root.
#[derive(Debug, Clone)]
pub struct IndexLayout {
    root: PathBuf,
}

impl IndexLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The generation currently serving queries.
    pub fn active(&self) -> PathBuf {
        self.root.join("active")
    }

    /// Single-slot rollback backup (previous active generation).
    pub fn backup(&self) -> PathBuf {
        self.root.join("backup")
    }

    /// Transient build area, isolated from the active generation.
    pub fn staging(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// Create the index root if missing.
    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Whether a built generation exists at the active slot.
    pub fn has_active(&self) -> bool {
        self.active().join("meta.json").exists()
    }
}
