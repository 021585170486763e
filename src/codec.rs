//! Binary codec
//!
//! Fixed-width big-endian integer encoding used for record lengths and
//! store addresses.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────────────────┐
//! │ u64, big-endian, 8 bytes     │
//! └──────────────────────────────┘
//! ```

use crate::error::{AnchorError, Result};

/// Width of every integer field in the store (lengths and addresses)
pub const INTEGER_SIZE: usize = 8;

/// Encode an integer as 8 big-endian bytes
pub fn encode_u64(value: u64) -> [u8; INTEGER_SIZE] {
    value.to_be_bytes()
}

/// Decode 8 big-endian bytes into an integer
///
/// The length check is explicit: a read near end-of-store may hand us a
/// short buffer, and that must surface as corruption rather than panic
/// or decode garbage.
pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let array: [u8; INTEGER_SIZE] = bytes.try_into().map_err(|_| {
        AnchorError::CorruptData(format!(
            "integer field truncated: expected {} bytes, got {}",
            INTEGER_SIZE,
            bytes.len()
        ))
    })?;

    Ok(u64::from_be_bytes(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for value in [0u64, 1, 2048, u64::MAX] {
            let encoded = encode_u64(value);
            assert_eq!(encoded.len(), INTEGER_SIZE);
            assert_eq!(decode_u64(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_big_endian_layout() {
        assert_eq!(encode_u64(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode_u64(2048), [0, 0, 0, 0, 0, 0, 0x08, 0x00]);
    }

    #[test]
    fn test_short_buffer_is_corrupt() {
        let result = decode_u64(&[0, 1, 2]);
        assert!(matches!(result, Err(AnchorError::CorruptData(_))));
    }

    #[test]
    fn test_long_buffer_is_corrupt() {
        let result = decode_u64(&[0u8; 9]);
        assert!(matches!(result, Err(AnchorError::CorruptData(_))));
    }

    #[test]
    fn test_empty_buffer_is_corrupt() {
        assert!(matches!(decode_u64(&[]), Err(AnchorError::CorruptData(_))));
    }
}
