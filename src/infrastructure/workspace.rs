//! Transient workspace for package construction
//!
//! Each package export stages its intermediate files in a private, uniquely
//! named directory. The handle owns the directory exclusively and is never
//! shared across concurrent exports; dropping it (or calling
//! [`TransientWorkspace::close`]) removes the directory, error paths
//! included.

use std::io;
use std::path::Path;

use tempfile::TempDir;

pub struct TransientWorkspace {
    dir: TempDir,
}

impl TransientWorkspace {
    /// Allocate a fresh scoped directory.
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("deckgen-export-")
            .tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now instead of at drop, surfacing any error.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
