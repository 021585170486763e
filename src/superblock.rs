//! Superblock manager
//!
//! The superblock is the fixed-size header region at the front of the
//! store. It holds the single mutable value in the whole file: the root
//! address at offset 0.
//!
//! ## Layout
//! ```text
//! ┌───────────────────────┬──────────────────────────────────┐
//! │ Root address (8, BE)  │ Reserved / zero (2040)           │
//! └───────────────────────┴──────────────────────────────────┘
//! 0                       8                               2048
//! ```
//!
//! Record appends never land inside this region; after reservation the
//! store is always at least [`SUPERBLOCK_SIZE`] bytes long.

use std::io::SeekFrom;

use tracing::debug;

use crate::backend::Backend;
use crate::codec::{decode_u64, encode_u64, INTEGER_SIZE};
use crate::error::{AnchorError, Result};

/// Size of the reserved header region in bytes
pub const SUPERBLOCK_SIZE: u64 = 2048;

/// Zero-fill chunk used when padding out a fresh superblock
const ZERO_CHUNK: [u8; 256] = [0u8; 256];

/// Reserve the superblock region, padding a short store with zeros
///
/// Idempotent: a store already at or past [`SUPERBLOCK_SIZE`] is left
/// untouched. Must be called under the store lock; the fresh root address
/// comes out as 0 ("empty") because the padding is all zeros.
pub(crate) fn reserve<B: Backend>(backend: &mut B) -> Result<()> {
    let end = backend.seek(SeekFrom::End(0))?;
    if end >= SUPERBLOCK_SIZE {
        return Ok(());
    }

    let mut remaining = SUPERBLOCK_SIZE - end;
    while remaining > 0 {
        let chunk = remaining.min(ZERO_CHUNK.len() as u64) as usize;
        backend.write_all(&ZERO_CHUNK[..chunk])?;
        remaining -= chunk as u64;
    }

    debug!(padded = SUPERBLOCK_SIZE - end, "reserved superblock");
    Ok(())
}

/// Read the committed root address from offset 0
///
/// Lock-free by design; see the consistency note on
/// [`Storage::get_root_address`](crate::Storage::get_root_address).
pub(crate) fn read_root<B: Backend>(backend: &mut B) -> Result<u64> {
    backend.seek(SeekFrom::Start(0))?;

    let mut buf = [0u8; INTEGER_SIZE];
    backend.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AnchorError::CorruptData("superblock truncated: root address unreadable".to_string())
        } else {
            AnchorError::Io(e)
        }
    })?;

    decode_u64(&buf)
}

/// Write a root address at offset 0
///
/// The sole write path into the superblock. Durability ordering (flush
/// before and after) is enforced by the commit protocol in the store,
/// not here.
pub(crate) fn write_root<B: Backend>(backend: &mut B, address: u64) -> Result<()> {
    backend.seek(SeekFrom::Start(0))?;
    backend.write_all(&encode_u64(address))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    #[test]
    fn test_reserve_pads_empty_store() {
        let mut backend = MemoryBackend::new();
        reserve(&mut backend).unwrap();

        assert_eq!(backend.len().unwrap(), SUPERBLOCK_SIZE);
        assert!(backend.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reserve_pads_partial_store() {
        let mut backend = MemoryBackend::from_bytes(vec![0u8; 100]);
        reserve(&mut backend).unwrap();

        assert_eq!(backend.len().unwrap(), SUPERBLOCK_SIZE);
    }

    #[test]
    fn test_reserve_is_idempotent() {
        let mut backend = MemoryBackend::new();
        reserve(&mut backend).unwrap();
        write_root(&mut backend, 42).unwrap();

        reserve(&mut backend).unwrap();
        assert_eq!(backend.len().unwrap(), SUPERBLOCK_SIZE);
        assert_eq!(read_root(&mut backend).unwrap(), 42);
    }

    #[test]
    fn test_reserve_leaves_larger_store_alone() {
        let mut store = vec![0u8; SUPERBLOCK_SIZE as usize];
        store.extend_from_slice(b"record bytes");
        let expected_len = store.len() as u64;

        let mut backend = MemoryBackend::from_bytes(store);
        reserve(&mut backend).unwrap();
        assert_eq!(backend.len().unwrap(), expected_len);
    }

    #[test]
    fn test_fresh_root_is_zero() {
        let mut backend = MemoryBackend::new();
        reserve(&mut backend).unwrap();
        assert_eq!(read_root(&mut backend).unwrap(), 0);
    }

    #[test]
    fn test_root_roundtrip() {
        let mut backend = MemoryBackend::new();
        reserve(&mut backend).unwrap();

        write_root(&mut backend, 2061).unwrap();
        assert_eq!(read_root(&mut backend).unwrap(), 2061);
    }

    #[test]
    fn test_truncated_superblock_is_corrupt() {
        let mut backend = MemoryBackend::from_bytes(vec![0u8; 4]);
        assert!(matches!(
            read_root(&mut backend),
            Err(AnchorError::CorruptData(_))
        ));
    }
}
