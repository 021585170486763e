//! Thread-safe storage wrapper
//!
//! The raw [`Storage`] handle shares one file cursor across every
//! operation, so it is single-threaded by construction. `SharedStorage`
//! is the "additional mutex" a multi-threaded caller needs: a cloneable
//! handle serializing all access through one `parking_lot::Mutex`.
//!
//! Within a process this also closes the root-read race: a reader going
//! through the mutex can never observe a half-applied commit.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{Backend, FileBackend};
use crate::error::Result;
use crate::store::{Storage, WriteBatch};

/// Cloneable, thread-safe handle over a [`Storage`]
pub struct SharedStorage<B: Backend = FileBackend> {
    inner: Arc<Mutex<Storage<B>>>,
}

impl<B: Backend> Clone for SharedStorage<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> SharedStorage<B> {
    /// Wrap a storage handle for use from multiple threads
    pub fn new(storage: Storage<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Append a record and return its address
    pub fn write(&self, data: &[u8]) -> Result<u64> {
        self.inner.lock().write(data)
    }

    /// Read the record at the given address
    pub fn read(&self, address: u64) -> Result<Vec<u8>> {
        self.inner.lock().read(address)
    }

    /// Read the committed root address
    pub fn get_root_address(&self) -> Result<u64> {
        self.inner.lock().get_root_address()
    }

    /// Durably commit a new root address
    pub fn commit_root_address(&self, address: u64) -> Result<()> {
        self.inner.lock().commit_root_address(address)
    }

    /// Flush pending writes and release the store lock
    pub fn unlock(&self) -> Result<()> {
        self.inner.lock().unlock()
    }

    /// Run a write batch as one closed transaction
    ///
    /// The closure appends records and returns the root address to
    /// commit. On closure error the batch is aborted and the previous
    /// root stays in place. The mutex is held for the whole transaction,
    /// so other threads observe it atomically.
    pub fn transact<F>(&self, f: F) -> Result<u64>
    where
        F: FnOnce(&mut WriteBatch<'_, B>) -> Result<u64>,
    {
        let mut store = self.inner.lock();
        let mut batch = store.begin_write()?;
        match f(&mut batch) {
            Ok(root) => {
                batch.commit(root)?;
                Ok(root)
            }
            Err(e) => {
                // Abort failures are secondary to the closure error
                let _ = batch.abort();
                Err(e)
            }
        }
    }
}
