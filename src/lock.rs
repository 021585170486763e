//! Lock manager
//!
//! Tracks whether this handle holds the store's exclusive advisory lock
//! and performs the OS-level acquire/release through the backend.
//!
//! ## Responsibilities
//! - Idempotent acquisition: at most one OS-level acquire per held period
//! - Flush-before-release so no held writes are lost at unlock
//! - Blocking, non-blocking, and bounded-wait acquisition modes
//!
//! This is a single-owner, single-level lock, not a reentrant mutex:
//! calling acquire twice without a release performs the OS acquisition
//! once, and nested acquire/release pairs do not compose — the inner
//! release drops the lock for the outer scope too.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::backend::Backend;
use crate::config::LockMode;
use crate::error::{AnchorError, Result};

/// Interval between acquisition attempts in [`LockMode::Timeout`]
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Whether this handle currently holds the store lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Lock not held by this handle
    Unlocked,

    /// Lock held by this handle (single level, not a count)
    Locked,
}

/// Lock bookkeeping for one store handle
///
/// The state only transitions to `Locked` after the OS call succeeds, so
/// an acquisition failure always leaves the handle observably unlocked.
#[derive(Debug)]
pub(crate) struct StoreLock {
    state: LockState,
}

impl StoreLock {
    pub(crate) fn new() -> Self {
        Self {
            state: LockState::Unlocked,
        }
    }

    pub(crate) fn state(&self) -> LockState {
        self.state
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// Acquire the exclusive lock on the backend if not already held
    ///
    /// Returns `true` if this call newly acquired the lock, `false` if the
    /// handle already held it (idempotent, not reentrant-counting).
    pub(crate) fn acquire<B: Backend>(&mut self, backend: &mut B, mode: LockMode) -> Result<bool> {
        if self.is_locked() {
            trace!("lock already held by this handle");
            return Ok(false);
        }

        match mode {
            LockMode::Blocking => backend
                .lock_exclusive()
                .map_err(|e| AnchorError::Lock(format!("lock acquisition failed: {e}")))?,
            LockMode::NonBlocking => Self::try_acquire(backend)?,
            LockMode::Timeout(limit) => Self::acquire_with_deadline(backend, limit)?,
        }

        self.state = LockState::Locked;
        debug!("acquired exclusive store lock");
        Ok(true)
    }

    /// Release the lock if held
    ///
    /// Flushes pending writes to the backend before the OS release, then
    /// clears the held state. No-op when not held.
    pub(crate) fn release<B: Backend>(&mut self, backend: &mut B) -> Result<()> {
        if !self.is_locked() {
            return Ok(());
        }

        backend.flush()?;
        backend
            .unlock_file()
            .map_err(|e| AnchorError::Lock(format!("lock release failed: {e}")))?;

        self.state = LockState::Unlocked;
        debug!("released exclusive store lock");
        Ok(())
    }

    /// Single non-blocking acquisition attempt
    fn try_acquire<B: Backend>(backend: &mut B) -> Result<()> {
        backend.try_lock_exclusive().map_err(|e| {
            if e.kind() == io::ErrorKind::WouldBlock {
                AnchorError::Lock("store is locked by another process".to_string())
            } else {
                AnchorError::Lock(format!("lock acquisition failed: {e}"))
            }
        })
    }

    /// Poll for the lock until the deadline passes
    fn acquire_with_deadline<B: Backend>(backend: &mut B, limit: Duration) -> Result<()> {
        let deadline = Instant::now() + limit;

        loop {
            match backend.try_lock_exclusive() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(AnchorError::Lock(format!(
                            "lock not acquired within {limit:?}"
                        )));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(AnchorError::Lock(format!("lock acquisition failed: {e}")));
                }
            }
        }
    }
}
