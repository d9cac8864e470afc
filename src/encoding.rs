//! Item encoding: the single self-delimiting byte string signed by the
//! ACC engine and hashed for CVC leaf data.
//!
//! Layout, all integers big-endian: `u32 len(data) || u32 len(tag) || data
//! || tag || u64 index`.

#![forbid(unsafe_code)]

use crate::errors::DecodeError;

/// Encode `(data, tag, index)` per the fixed layout. `index` is always
/// non-negative by type (`u64`); callers constructing an index from a
/// signed source must reject negatives before calling this.
pub fn encode_item(data: &[u8], tag: &[u8], index: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + data.len() + tag.len() + 8);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&(tag.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(tag);
    out.extend_from_slice(&index.to_be_bytes());
    out
}

/// Decode a buffer produced by [`encode_item`]. Fails on truncation or on
/// length fields that would read past the end of the buffer.
pub fn decode_item(buf: &[u8]) -> Result<(Vec<u8>, Vec<u8>, u64), DecodeError> {
    if buf.len() < 8 {
        return Err(DecodeError::Truncated { need: 8, got: buf.len() });
    }
    let dlen = u32::from_be_bytes(buf[0..4].try_into().unwrap()) as usize;
    let tlen = u32::from_be_bytes(buf[4..8].try_into().unwrap()) as usize;
    let mut offset = 8usize;

    let need = offset
        .checked_add(dlen)
        .and_then(|v| v.checked_add(tlen))
        .and_then(|v| v.checked_add(8))
        .ok_or(DecodeError::LengthOverflow { field: "data+tag" })?;
    if buf.len() < need {
        return Err(DecodeError::Truncated { need, got: buf.len() });
    }

    let data = buf[offset..offset + dlen].to_vec();
    offset += dlen;
    let tag = buf[offset..offset + tlen].to_vec();
    offset += tlen;
    let index = u64::from_be_bytes(buf[offset..offset + 8].try_into().unwrap());
    Ok((data, tag, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_exactly() {
        let encoded = encode_item(b"abc", b"tag", 42);
        let (data, tag, index) = decode_item(&encoded).unwrap();
        assert_eq!(data, b"abc");
        assert_eq!(tag, b"tag");
        assert_eq!(index, 42);
    }

    #[test]
    fn empty_data_and_tag_round_trip() {
        let encoded = encode_item(b"", b"", 0);
        let (data, tag, index) = decode_item(&encoded).unwrap();
        assert!(data.is_empty());
        assert!(tag.is_empty());
        assert_eq!(index, 0);
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(decode_item(&[0u8; 4]).is_err());
    }

    #[test]
    fn rejects_length_field_past_end_of_buffer() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(1_000_000u32).to_be_bytes()); // claims huge data len
        buf.extend_from_slice(&(0u32).to_be_bytes());
        buf.extend_from_slice(&0u64.to_be_bytes());
        assert!(decode_item(&buf).is_err());
    }

    #[test]
    fn different_encodings_for_different_fields() {
        let a = encode_item(b"data", b"tag1", 1);
        let b = encode_item(b"data", b"tag2", 1);
        let c = encode_item(b"data", b"tag1", 2);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
