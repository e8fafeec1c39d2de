//! Opens the on-disk workspace as a [`Core`] for one CLI invocation.

use std::future::Future;
use std::path::PathBuf;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::Result;
use crate::host::{MemoryDocument, NoopLoader};
use crate::protocol::Core;
use crate::storage::Storage;
use crate::store::FileStore;

pub type FileCore = Core<FileStore, MemoryDocument, NoopLoader, SystemClock>;

pub struct Session {
    storage: Storage,
    core: FileCore,
}

/// Directory from `--dir`, or the current directory.
pub fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

impl Session {
    /// Open an initialized workspace.
    pub fn open(dir: Option<PathBuf>) -> Result<Self> {
        let storage = Storage::new(resolve_dir(dir)?);
        storage.ensure_initialized()?;

        let config = Config::load_from_dir(storage.root());
        let store = FileStore::open(storage.store_file())
            .with_lock_timeout(config.store.lock_timeout_ms);
        let document = storage.read_document()?;

        Ok(Self {
            core: Core::new(store, document, NoopLoader, SystemClock, config),
            storage,
        })
    }

    pub fn core(&self) -> &FileCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut FileCore {
        &mut self.core
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Persist the document after a command changed it.
    pub fn save_document(&self) -> Result<()> {
        self.storage.write_document(self.core.document())
    }
}

/// Run a future to completion on a current-thread runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
