//! Record log
//!
//! Appends length-prefixed opaque byte payloads past the superblock and
//! reads them back by address.
//!
//! ## Record Format
//! ```text
//! ┌──────────────────┬───────────────────────────┐
//! │ Length (8, BE)   │ Payload (Length bytes)    │
//! └──────────────────┴───────────────────────────┘
//! ▲
//! └── the record's address
//! ```
//!
//! Records are contiguous, unpadded, and carry no checksums or type tags;
//! once written they are immutable and never move, which is what makes
//! lock-free reads sound.

use std::io::SeekFrom;

use crate::backend::Backend;
use crate::codec::{decode_u64, encode_u64, INTEGER_SIZE};
use crate::error::{AnchorError, Result};
use crate::superblock::SUPERBLOCK_SIZE;

/// Append a record and return its address
///
/// The address is the offset of the length prefix. No flush happens here;
/// durability is deferred to the commit protocol.
pub(crate) fn append<B: Backend>(backend: &mut B, data: &[u8]) -> Result<u64> {
    let address = backend.seek(SeekFrom::End(0))?;
    backend.write_all(&encode_u64(data.len() as u64))?;
    backend.write_all(data)?;
    Ok(address)
}

/// Read the record at the given address
///
/// Fails closed: any shortfall between the decoded length and the bytes
/// actually present is `CorruptData`, never a partial payload.
pub(crate) fn read_at<B: Backend>(backend: &mut B, address: u64) -> Result<Vec<u8>> {
    let store_len = backend.len()?;

    if address < SUPERBLOCK_SIZE {
        return Err(AnchorError::OutOfRange {
            address,
            reason: format!(
                "inside superblock region (records start at {SUPERBLOCK_SIZE}; root 0 means empty)"
            ),
        });
    }
    if address >= store_len {
        return Err(AnchorError::OutOfRange {
            address,
            reason: format!("beyond end of store (length {store_len})"),
        });
    }

    backend.seek(SeekFrom::Start(address))?;

    let mut prefix = [0u8; INTEGER_SIZE];
    backend.read_exact(&mut prefix).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AnchorError::CorruptData(format!("length prefix truncated at address {address}"))
        } else {
            AnchorError::Io(e)
        }
    })?;

    let length = decode_u64(&prefix)?;
    // Checked add: a garbage prefix can decode to a length that overflows
    // the offset arithmetic, which must read as corruption, not wrap.
    let payload_end = (address + INTEGER_SIZE as u64).checked_add(length);
    if payload_end.map_or(true, |end| end > store_len) {
        return Err(AnchorError::CorruptData(format!(
            "record at address {address} claims {length} bytes but store ends at {store_len}"
        )));
    }

    let length = usize::try_from(length).map_err(|_| {
        AnchorError::CorruptData(format!(
            "record length {length} at address {address} exceeds addressable memory"
        ))
    })?;

    let mut data = vec![0u8; length];
    backend.read_exact(&mut data).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AnchorError::CorruptData(format!("record payload truncated at address {address}"))
        } else {
            AnchorError::Io(e)
        }
    })?;

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::superblock;

    fn reserved_backend() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        superblock::reserve(&mut backend).unwrap();
        backend
    }

    #[test]
    fn test_first_record_lands_after_superblock() {
        let mut backend = reserved_backend();
        let address = append(&mut backend, b"hello").unwrap();
        assert_eq!(address, SUPERBLOCK_SIZE);
    }

    #[test]
    fn test_append_read_roundtrip() {
        let mut backend = reserved_backend();

        let address = append(&mut backend, b"payload").unwrap();
        assert_eq!(read_at(&mut backend, address).unwrap(), b"payload");
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let mut backend = reserved_backend();

        let address = append(&mut backend, b"").unwrap();
        assert_eq!(read_at(&mut backend, address).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_addresses_are_monotonic_and_disjoint() {
        let mut backend = reserved_backend();

        let a1 = append(&mut backend, b"hello").unwrap();
        let a2 = append(&mut backend, b"world!").unwrap();
        let a3 = append(&mut backend, b"").unwrap();

        assert_eq!(a2, a1 + INTEGER_SIZE as u64 + 5);
        assert_eq!(a3, a2 + INTEGER_SIZE as u64 + 6);
    }

    #[test]
    fn test_read_at_zero_is_out_of_range() {
        let mut backend = reserved_backend();
        append(&mut backend, b"data").unwrap();

        assert!(matches!(
            read_at(&mut backend, 0),
            Err(AnchorError::OutOfRange { address: 0, .. })
        ));
    }

    #[test]
    fn test_read_inside_superblock_is_out_of_range() {
        let mut backend = reserved_backend();

        assert!(matches!(
            read_at(&mut backend, 8),
            Err(AnchorError::OutOfRange { address: 8, .. })
        ));
    }

    #[test]
    fn test_read_past_end_is_out_of_range() {
        let mut backend = reserved_backend();
        let address = append(&mut backend, b"data").unwrap();

        let past_end = address + 100;
        assert!(matches!(
            read_at(&mut backend, past_end),
            Err(AnchorError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let mut backend = reserved_backend();
        let address = append(&mut backend, b"hello world").unwrap();

        // Chop the store mid-payload
        let mut bytes = backend.into_bytes();
        bytes.truncate((address + INTEGER_SIZE as u64 + 4) as usize);
        let mut backend = MemoryBackend::from_bytes(bytes);

        assert!(matches!(
            read_at(&mut backend, address),
            Err(AnchorError::CorruptData(_))
        ));
    }

    #[test]
    fn test_truncated_length_prefix_is_corrupt_or_out_of_range() {
        let mut backend = reserved_backend();
        let address = append(&mut backend, b"hello").unwrap();

        // Leave only 3 bytes of the 8-byte prefix
        let mut bytes = backend.into_bytes();
        bytes.truncate((address + 3) as usize);
        let mut backend = MemoryBackend::from_bytes(bytes);

        assert!(matches!(
            read_at(&mut backend, address),
            Err(AnchorError::CorruptData(_))
        ));
    }
}
