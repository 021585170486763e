//! Storage backend abstraction
//!
//! The backend trait abstracts the underlying byte sink, allowing both a
//! file-based (production) and an in-memory (testing) implementation.
//!
//! ## Responsibilities
//! - Seek/read/write/flush access to the store bytes
//! - Durable sync (fsync) for the commit path
//! - OS-level exclusive locking for cross-process exclusion
//!
//! A backend is exclusively owned by one [`Storage`](crate::Storage) handle
//! for its open lifetime; the shared cursor is why the raw handle is not
//! thread-safe within a process (see [`SharedStorage`](crate::SharedStorage)).

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;

/// Byte sink underneath the store
///
/// Extends the std I/O traits with length/sync queries and whole-file
/// advisory locking. Lock calls block or fail at the OS level; the
/// idempotence bookkeeping lives in [`lock`](crate::lock), not here.
pub trait Backend: Read + Write + Seek {
    /// Current total length of the store in bytes
    fn len(&mut self) -> io::Result<u64>;

    /// Whether the store currently holds zero bytes
    fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Force written bytes to durable storage
    fn sync(&mut self) -> io::Result<()>;

    /// Acquire the exclusive advisory lock, blocking until available
    fn lock_exclusive(&mut self) -> io::Result<()>;

    /// Acquire the exclusive advisory lock without blocking
    ///
    /// Fails with `ErrorKind::WouldBlock` if another handle holds it.
    fn try_lock_exclusive(&mut self) -> io::Result<()>;

    /// Release the exclusive advisory lock
    fn unlock_file(&mut self) -> io::Result<()>;
}

// =============================================================================
// File Backend
// =============================================================================

/// File-based backend
///
/// Opens the store file read+write, creating it when missing. Locking uses
/// OS advisory locks (`flock` on Unix, `LockFileEx` on Windows), which are
/// released automatically if the process dies while holding them.
pub struct FileBackend {
    file: File,
}

impl FileBackend {
    /// Open or create the store file at the given path
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        Ok(Self { file })
    }

    /// Wrap an already-open file handle
    ///
    /// The handle must be readable, writable, and seekable.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl Read for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileBackend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileBackend {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Backend for FileBackend {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_data()
    }

    fn lock_exclusive(&mut self) -> io::Result<()> {
        FileExt::lock_exclusive(&self.file)
    }

    fn try_lock_exclusive(&mut self) -> io::Result<()> {
        FileExt::try_lock_exclusive(&self.file)
    }

    fn unlock_file(&mut self) -> io::Result<()> {
        FileExt::unlock(&self.file)
    }
}

// =============================================================================
// Memory Backend
// =============================================================================

/// In-memory backend for tests and ephemeral stores
///
/// A `Cursor<Vec<u8>>` with no-op sync and locking: a memory store is
/// single-process by construction, so OS exclusion has nothing to guard.
#[derive(Default)]
pub struct MemoryBackend {
    cursor: Cursor<Vec<u8>>,
}

impl MemoryBackend {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw bytes (for corruption tests)
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Borrow the raw store bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Consume the backend and return the raw store bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl Read for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Write for MemoryBackend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.cursor.flush()
    }
}

impl Seek for MemoryBackend {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Backend for MemoryBackend {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn lock_exclusive(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn try_lock_exclusive(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn unlock_file(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.db");

        assert!(!path.exists());
        let mut backend = FileBackend::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(backend.len().unwrap(), 0);
    }

    #[test]
    fn test_file_backend_len_tracks_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.db");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.write_all(b"hello").unwrap();
        backend.flush().unwrap();
        assert_eq!(backend.len().unwrap(), 5);
    }

    #[test]
    fn test_memory_backend_roundtrip() {
        let mut backend = MemoryBackend::new();
        backend.write_all(b"abc").unwrap();
        backend.seek(SeekFrom::Start(0)).unwrap();

        let mut buf = [0u8; 3];
        backend.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
        assert_eq!(backend.len().unwrap(), 3);
    }

    #[test]
    fn test_memory_backend_lock_is_noop() {
        let mut backend = MemoryBackend::new();
        backend.lock_exclusive().unwrap();
        backend.try_lock_exclusive().unwrap();
        backend.unlock_file().unwrap();
    }
}
