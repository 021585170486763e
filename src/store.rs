//! Storage handle
//!
//! The coordinator that ties the backend, lock manager, superblock, and
//! record log into one handle with the commit protocol on top.
//!
//! ## Locking Discipline
//!
//! - `open` acquires the lock while reserving the superblock and keeps it.
//! - `write` acquires the lock (idempotently) and keeps it, so a run of
//!   writes forms one implicit critical section.
//! - `commit_root_address` is the transaction boundary: it flushes, writes
//!   the root, flushes again, and releases the lock on every exit path.
//! - `read` and `get_root_address` never touch the lock.
//!
//! [`WriteBatch`] makes the write-then-commit critical section explicit in
//! the type system; prefer it over raw `write` + `commit_root_address`
//! call sequences.

use std::path::Path;

use tracing::{debug, error, trace};

use crate::backend::{Backend, FileBackend};
use crate::config::Config;
use crate::error::{AnchorError, Result};
use crate::lock::StoreLock;
use crate::superblock::SUPERBLOCK_SIZE;
use crate::{log, superblock};

/// A single-file append-only store with a committed root pointer
///
/// ## Concurrency Model
///
/// - **Cross-process**: one whole-file exclusive advisory lock; any
///   mutation (reservation, append, commit) requires holding it.
/// - **Intra-process**: NOT thread-safe — every operation moves the shared
///   file cursor, so `&mut self` is required throughout. Wrap the handle
///   in [`SharedStorage`](crate::SharedStorage) to share it across threads.
pub struct Storage<B: Backend = FileBackend> {
    /// Storage configuration
    config: Config,

    /// Exclusively-owned backing byte sink
    backend: B,

    /// Advisory-lock bookkeeping for this handle
    lock: StoreLock,
}

impl Storage<FileBackend> {
    /// Open or create a store file at the given path
    ///
    /// Uses default config (blocking lock, fsync on commit) with the
    /// specified path.
    pub fn open(path: &Path) -> Result<Self> {
        let config = Config::builder().path(path).build();
        Self::open_with(config)
    }

    /// Open or create a store file using the given config
    pub fn open_with(config: Config) -> Result<Self> {
        let backend = FileBackend::open(&config.path)?;
        Self::from_backend(backend, config)
    }
}

impl<B: Backend> Storage<B> {
    /// Build a store on an arbitrary backend
    ///
    /// Acquires the lock and reserves the superblock. The lock stays held
    /// after opening; the first commit (or an explicit [`unlock`](Self::unlock))
    /// releases it.
    pub fn from_backend(backend: B, config: Config) -> Result<Self> {
        let mut store = Self {
            config,
            backend,
            lock: StoreLock::new(),
        };

        store.lock()?;
        superblock::reserve(&mut store.backend)?;
        debug!("opened store");
        Ok(store)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Append a record and return its address
    ///
    /// Acquires the lock if not already held and keeps it, so consecutive
    /// writes stay in one critical section until a commit or unlock. The
    /// bytes are not flushed here; only a commit makes them durable.
    pub fn write(&mut self, data: &[u8]) -> Result<u64> {
        self.lock()?;
        let address = log::append(&mut self.backend, data)?;
        trace!(address, len = data.len(), "appended record");
        Ok(address)
    }

    /// Read the record at the given address
    ///
    /// Lock-free: a record's bytes never change once its address has been
    /// handed out, so no synchronization is needed. Fails with
    /// [`AnchorError::OutOfRange`] for addresses inside the superblock or
    /// past end-of-store, and [`AnchorError::CorruptData`] when the store
    /// ends mid-record. Note that address 0 is the "empty structure" root
    /// sentinel, not a readable record.
    pub fn read(&mut self, address: u64) -> Result<Vec<u8>> {
        log::read_at(&mut self.backend, address)
    }

    // =========================================================================
    // Root Pointer Operations
    // =========================================================================

    /// Read the committed root address (0 means "no data")
    ///
    /// Lock-free by design, which means a reader racing a concurrent
    /// commit may observe either the old or the new root — the store
    /// guarantees nothing beyond what the OS offers for an 8-byte aligned
    /// write. Callers needing a stable view within one process should use
    /// [`SharedStorage`](crate::SharedStorage).
    pub fn get_root_address(&mut self) -> Result<u64> {
        superblock::read_root(&mut self.backend)
    }

    /// Durably commit a new root address and release the lock
    ///
    /// The transaction boundary of the engine: flush pending record
    /// writes, write the root at offset 0, flush again, then release the
    /// lock — on every exit path, including failed commits. After this
    /// returns, the new root is visible to any reader of the store.
    pub fn commit_root_address(&mut self, address: u64) -> Result<()> {
        if address != 0 && address < SUPERBLOCK_SIZE {
            return Err(AnchorError::OutOfRange {
                address,
                reason: format!(
                    "root must be 0 (empty) or a record address at or past {SUPERBLOCK_SIZE}"
                ),
            });
        }

        self.lock()?;
        let committed = self.commit_inner(address);
        let released = self.unlock();
        if committed.is_ok() {
            debug!(root = address, "committed root address");
        }
        committed.and(released)
    }

    /// Flush / write-root / flush sequence, performed under the lock
    fn commit_inner(&mut self, address: u64) -> Result<()> {
        self.flush_backend()?;
        superblock::write_root(&mut self.backend, address)?;
        self.flush_backend()
    }

    fn flush_backend(&mut self) -> Result<()> {
        if self.config.sync_on_commit {
            self.backend.sync()?;
        } else {
            self.backend.flush()?;
        }
        Ok(())
    }

    // =========================================================================
    // Lock Operations
    // =========================================================================

    /// Acquire the store lock if this handle does not already hold it
    ///
    /// Returns `true` when newly acquired, `false` when already held.
    /// Blocking behavior follows [`Config::lock_mode`].
    pub fn lock(&mut self) -> Result<bool> {
        self.lock.acquire(&mut self.backend, self.config.lock_mode)
    }

    /// Flush pending writes and release the store lock; no-op if not held
    pub fn unlock(&mut self) -> Result<()> {
        self.lock.release(&mut self.backend)
    }

    /// Whether this handle currently holds the store lock
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    // =========================================================================
    // Batched Writes
    // =========================================================================

    /// Start an explicit write batch, holding the lock for its lifetime
    ///
    /// The batch ends with [`WriteBatch::commit`] or [`WriteBatch::abort`];
    /// dropping it releases the lock without committing.
    pub fn begin_write(&mut self) -> Result<WriteBatch<'_, B>> {
        self.lock()?;
        Ok(WriteBatch {
            store: self,
            finished: false,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release any held lock and close the store
    pub fn close(mut self) -> Result<()> {
        self.unlock()?;
        debug!("closed store");
        Ok(())
    }

    /// Current total store length in bytes (superblock included)
    pub fn len(&mut self) -> Result<u64> {
        Ok(self.backend.len()?)
    }

    /// Whether the store holds no records beyond the superblock
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? <= SUPERBLOCK_SIZE)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<B: Backend> Drop for Storage<B> {
    fn drop(&mut self) {
        // Last-resort release so a dropped handle never strands the lock.
        if self.lock.is_locked() {
            if let Err(e) = self.lock.release(&mut self.backend) {
                error!(error = %e, "failed to release store lock on drop");
            }
        }
    }
}

// =============================================================================
// Write Batch
// =============================================================================

/// An explicit critical section over the store
///
/// Holds the store lock from [`Storage::begin_write`] until `commit`,
/// `abort`, or drop. This puts the "write N records, then commit the
/// root" contract in the type instead of leaving it implicit in call
/// order.
pub struct WriteBatch<'a, B: Backend> {
    store: &'a mut Storage<B>,
    finished: bool,
}

impl<B: Backend> WriteBatch<'_, B> {
    /// Append a record under the held lock and return its address
    pub fn write(&mut self, data: &[u8]) -> Result<u64> {
        self.store.write(data)
    }

    /// Read a record; batches may resolve addresses they just wrote
    pub fn read(&mut self, address: u64) -> Result<Vec<u8>> {
        self.store.read(address)
    }

    /// Commit the given root address durably and end the batch
    pub fn commit(mut self, root_address: u64) -> Result<()> {
        self.finished = true;
        self.store.commit_root_address(root_address)
    }

    /// End the batch without committing
    ///
    /// Records appended by this batch stay in the file but remain
    /// unreachable from the committed root (append-only garbage; this
    /// layer does no compaction).
    pub fn abort(mut self) -> Result<()> {
        self.finished = true;
        self.store.unlock()
    }
}

impl<B: Backend> Drop for WriteBatch<'_, B> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.store.unlock() {
                error!(error = %e, "failed to release store lock on batch drop");
            }
        }
    }
}
