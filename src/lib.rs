//! # anchorlog
//!
//! A minimal durable storage primitive: an append-only binary log with a
//! fixed-size superblock holding a single mutable pointer — the current
//! root address.
//!
//! - Immutable, addressable, variable-length records
//! - An atomically committed root pointer surviving crashes
//! - Cross-process exclusion via one whole-file advisory lock
//! - Lock-free reads riding on append-only immutability
//!
//! It is the foundation layer for a higher-level persistent structure
//! (a copy-on-write tree or object graph): write records bottom-up, then
//! commit the new root address as the single visible pointer into the log.
//!
//! ## Store Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Superblock (2048 bytes)                                      │
//! │ ┌────────────────────────┬─────────────────────────────────┐ │
//! │ │ Root address (8, BE)   │ Reserved / zero                 │ │
//! │ └────────────────────────┴─────────────────────────────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record                                                       │
//! │ ┌────────────────────────┬─────────────────────────────────┐ │
//! │ │ Length (8, BE)         │ Payload (opaque bytes)          │ │
//! │ └────────────────────────┴─────────────────────────────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record ...                                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use anchorlog::{Result, Storage};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let mut store = Storage::open(Path::new("tree.db"))?;
//!
//!     let mut batch = store.begin_write()?;
//!     let leaf = batch.write(b"leaf node")?;
//!     let root = batch.write(&leaf.to_be_bytes())?;
//!     batch.commit(root)?;
//!
//!     assert_eq!(store.get_root_address()?, root);
//!     store.close()
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod backend;
pub mod lock;
pub mod superblock;
pub mod log;
pub mod store;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AnchorError, Result};
pub use config::{Config, LockMode};
pub use backend::{Backend, FileBackend, MemoryBackend};
pub use lock::LockState;
pub use superblock::SUPERBLOCK_SIZE;
pub use store::{Storage, WriteBatch};
pub use shared::SharedStorage;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of anchorlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
