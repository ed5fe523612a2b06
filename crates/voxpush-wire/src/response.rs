use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::error::{Result, WireError};
use crate::field::{WIRE_TYPE_LENGTH_DELIMITED, WIRE_TYPE_VARINT};
use crate::varint::read_varint;

/// One decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Wire type 0.
    Varint(u64),
    /// Wire type 2, raw bytes.
    Bytes(Bytes),
}

impl FieldValue {
    pub fn as_varint(&self) -> Option<u64> {
        match self {
            FieldValue::Varint(value) => Some(*value),
            FieldValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Varint(_) => None,
            FieldValue::Bytes(bytes) => Some(bytes.as_ref()),
        }
    }
}

/// Field number → value map of one decoded message.
pub type FieldMap = BTreeMap<u32, FieldValue>;

/// Reply field numbers the device uses.
///
/// Replies are flat: the device does not wrap them in the request's outer
/// envelope, and its numbering does not match the request side. Observed
/// behavior, kept as-is.
pub mod reply_fields {
    pub const INSTALLED_ID: u32 = 2;
    pub const INSTALLED_VERSION: u32 = 3;
    pub const TARGET_ID: u32 = 4;
    pub const STATE: u32 = 5;
}

/// Decode a base64 datapoint reply into a field map.
///
/// The leading varint is the device's declared length. It is read but never
/// checked against the remaining bytes; observed replies occasionally
/// disagree, and the field scan is bounded by the buffer either way.
pub fn parse_response(payload: &str) -> Result<FieldMap> {
    let data = STANDARD.decode(payload)?;
    let (_declared_len, pos) = read_varint(&data, 0)?;
    parse_fields(&data[pos..])
}

/// Scan raw tag/value pairs until the end of `buf`.
///
/// Last write wins when a field number repeats (the device is not known to
/// repeat fields). Truncation mid-field is an error, never a partial result.
pub fn parse_fields(buf: &[u8]) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    let mut pos = 0;
    while pos < buf.len() {
        let (tag, next) = read_varint(buf, pos)?;
        pos = next;
        let field = (tag >> 3) as u32;
        match (tag & 7) as u8 {
            WIRE_TYPE_VARINT => {
                let (value, next) = read_varint(buf, pos)?;
                pos = next;
                fields.insert(field, FieldValue::Varint(value));
            }
            WIRE_TYPE_LENGTH_DELIMITED => {
                let (len, next) = read_varint(buf, pos)?;
                pos = next;
                let end = pos
                    .checked_add(len as usize)
                    .filter(|&end| end <= buf.len())
                    .ok_or(WireError::Truncated { offset: buf.len() })?;
                fields.insert(field, FieldValue::Bytes(Bytes::copy_from_slice(&buf[pos..end])));
                pos = end;
            }
            wire_type => {
                return Err(WireError::UnsupportedWireType { wire_type, field });
            }
        }
    }
    Ok(fields)
}

/// Typed view of an install reply.
///
/// Absent fields mean the device omitted them, not a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReply {
    /// Pack id the device reports as currently installed.
    pub installed_id: Option<u64>,
    /// Version of the currently installed pack.
    pub installed_version: Option<u64>,
    /// Pack id the command targeted, echoed back.
    pub target_id: Option<u64>,
    /// Raw confirmation state code.
    pub state: Option<u64>,
    /// Fields this crate does not recognize, kept for diagnosis.
    pub unknown: FieldMap,
}

impl InstallReply {
    /// Decode a base64 reply payload straight into the typed view.
    pub fn parse(payload: &str) -> Result<Self> {
        Ok(Self::from_fields(&parse_response(payload)?))
    }

    /// Project a decoded field map into the typed view.
    pub fn from_fields(fields: &FieldMap) -> Self {
        let mut reply = InstallReply::default();
        for (&field, value) in fields {
            match field {
                reply_fields::INSTALLED_ID => reply.installed_id = value.as_varint(),
                reply_fields::INSTALLED_VERSION => {
                    reply.installed_version = value.as_varint();
                }
                reply_fields::TARGET_ID => reply.target_id = value.as_varint(),
                reply_fields::STATE => reply.state = value.as_varint(),
                _ => {
                    reply.unknown.insert(field, value.clone());
                }
            }
        }
        reply
    }
}
