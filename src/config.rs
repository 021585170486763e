//! Configuration for anchorlog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a storage instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Path of the backing store file
    pub path: PathBuf,

    // -------------------------------------------------------------------------
    // Lock Configuration
    // -------------------------------------------------------------------------
    /// How lock acquisition behaves when another process holds the lock
    pub lock_mode: LockMode,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Whether a root commit fsyncs the store (flush-only when disabled)
    pub sync_on_commit: bool,
}

/// Lock acquisition mode
#[derive(Debug, Clone, Copy)]
pub enum LockMode {
    /// Block the calling thread until the lock is available (default)
    Blocking,

    /// Fail immediately with a lock error if the lock is held elsewhere
    NonBlocking,

    /// Poll for the lock until the deadline, then fail with a lock error
    Timeout(Duration),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./anchorlog.db"),
            lock_mode: LockMode::Blocking,
            sync_on_commit: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing store path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the lock acquisition mode
    pub fn lock_mode(mut self, mode: LockMode) -> Self {
        self.config.lock_mode = mode;
        self
    }

    /// Set whether root commits fsync the store
    pub fn sync_on_commit(mut self, sync: bool) -> Self {
        self.config.sync_on_commit = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
