use bytes::{BufMut, BytesMut};

use crate::varint::put_varint;

/// Wire type of a varint-valued field.
pub const WIRE_TYPE_VARINT: u8 = 0;

/// Wire type of a length-delimited (bytes/string/sub-message) field.
pub const WIRE_TYPE_LENGTH_DELIMITED: u8 = 2;

/// Append `field #N = value` as a varint field: tag `(N << 3) | 0`, then the
/// value itself.
pub fn put_varint_field(dst: &mut BytesMut, field: u32, value: u64) {
    put_varint(dst, tag(field, WIRE_TYPE_VARINT));
    put_varint(dst, value);
}

/// Append `field #N = bytes` as a length-delimited field: tag `(N << 3) | 2`,
/// a varint byte count, then the bytes verbatim.
///
/// Strings go through here as their UTF-8 bytes; nested messages as their
/// already-encoded form.
pub fn put_bytes_field(dst: &mut BytesMut, field: u32, value: &[u8]) {
    put_varint(dst, tag(field, WIRE_TYPE_LENGTH_DELIMITED));
    put_varint(dst, value.len() as u64);
    dst.put_slice(value);
}

fn tag(field: u32, wire_type: u8) -> u64 {
    (u64::from(field) << 3) | u64::from(wire_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_field_layout() {
        let mut buf = BytesMut::new();
        put_varint_field(&mut buf, 1, 502);
        // tag (1 << 3) | 0 = 0x08, then varint(502).
        assert_eq!(buf.to_vec(), vec![0x08, 0xF6, 0x03]);
    }

    #[test]
    fn test_bytes_field_layout() {
        let mut buf = BytesMut::new();
        put_bytes_field(&mut buf, 2, b"abc");
        // tag (2 << 3) | 2 = 0x12, length 3, then the bytes.
        assert_eq!(buf.to_vec(), vec![0x12, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_empty_bytes_field() {
        let mut buf = BytesMut::new();
        put_bytes_field(&mut buf, 2, b"");
        assert_eq!(buf.to_vec(), vec![0x12, 0x00]);
    }

    #[test]
    fn test_multibyte_tag() {
        let mut buf = BytesMut::new();
        put_varint_field(&mut buf, 16, 1);
        // (16 << 3) | 0 = 128 needs two tag bytes.
        assert_eq!(buf.to_vec(), vec![0x80, 0x01, 0x01]);
    }
}
