//! Wire codec for the vacuum's voice-pack datapoint.
//!
//! The device speaks a minimal protobuf-style format on this datapoint:
//! varint-encoded tags and lengths, varint (wire type 0) and length-delimited
//! (wire type 2) fields, and nothing else. Outbound commands wrap their
//! fields in a two-level envelope and ship as base64; replies come back as a
//! flat field list. Both directions are handled here as pure functions.

pub mod command;
pub mod error;
pub mod field;
pub mod response;
pub mod varint;

pub use command::{request_fields, InstallRequest};
pub use error::{Result, WireError};
pub use field::{
    put_bytes_field, put_varint_field, WIRE_TYPE_LENGTH_DELIMITED, WIRE_TYPE_VARINT,
};
pub use response::{
    parse_fields, parse_response, reply_fields, FieldMap, FieldValue, InstallReply,
};
pub use varint::{put_varint, read_varint};
