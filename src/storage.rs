//! On-disk layout for a relnotes workspace
//!
//! ```text
//! <dir>/
//!   .relnotes.toml            # Optional configuration
//!   .relnotes/
//!     store.json              # Namespaced key/value store
//!     store.json.lock         # Sidecar lock for store writes
//!     document.json           # Host document the CLI publishes into
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::host::MemoryDocument;
use crate::lock;

/// Name of the workspace-local state directory
pub const LOCAL_DIR: &str = ".relnotes";

/// Path manager for relnotes state
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.relnotes/` state directory
    pub fn local_dir(&self) -> PathBuf {
        self.root.join(LOCAL_DIR)
    }

    /// Path to the configuration file
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to the key/value store file
    pub fn store_file(&self) -> PathBuf {
        self.local_dir().join("store.json")
    }

    /// Path to the persisted host document
    pub fn document_file(&self) -> PathBuf {
        self.local_dir().join("document.json")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the state directory, an empty store and an empty document.
    ///
    /// Existing files are left untouched. Returns the paths that were created.
    pub fn init(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        let local = self.local_dir();
        if !local.exists() {
            fs::create_dir_all(&local)?;
            created.push(local);
        }

        let store_file = self.store_file();
        if !store_file.exists() {
            lock::write_atomic(&store_file, b"{}")?;
            created.push(store_file);
        }

        let document_file = self.document_file();
        if !document_file.exists() {
            self.write_json(&document_file, &MemoryDocument::new())?;
            created.push(document_file);
        }

        Ok(created)
    }

    /// Check if the workspace has been initialized
    pub fn is_initialized(&self) -> bool {
        self.local_dir().exists()
    }

    /// Fail with `Error::NotInitialized` unless `init` has run
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized(self.root.clone()))
        }
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    // =========================================================================
    // Document persistence
    // =========================================================================

    /// Load the persisted host document, or a fresh one if none exists yet
    pub fn read_document(&self) -> Result<MemoryDocument> {
        let path = self.document_file();
        if !path.exists() {
            return Ok(MemoryDocument::new());
        }
        self.read_json(&path)
    }

    /// Persist the host document
    pub fn write_document(&self, document: &MemoryDocument) -> Result<()> {
        self.write_json(&self.document_file(), document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        let storage = Storage::new(root.clone());

        assert_eq!(storage.local_dir(), root.join(".relnotes"));
        assert_eq!(storage.store_file(), root.join(".relnotes/store.json"));
        assert_eq!(storage.document_file(), root.join(".relnotes/document.json"));
        assert_eq!(storage.config_file(), root.join(".relnotes.toml"));
    }

    #[test]
    fn init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());

        assert!(storage.ensure_initialized().is_err());
        let created = storage.init().unwrap();
        assert_eq!(created.len(), 3);
        assert!(storage.store_file().exists());
        assert!(storage.document_file().exists());

        let created_again = storage.init().unwrap();
        assert!(created_again.is_empty());
        storage.ensure_initialized().unwrap();
    }

    #[test]
    fn document_round_trips_through_disk() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        storage.init().unwrap();

        let mut document = storage.read_document().unwrap();
        let page = document.add_page("Buttons");
        document.add_component_set(&page, "Button", 400.0, 80.0);
        storage.write_document(&document).unwrap();

        let reloaded = storage.read_document().unwrap();
        assert_eq!(reloaded.component_set_infos().len(), 1);
        assert_eq!(reloaded.component_set_infos()[0].name, "Button");
    }
}
