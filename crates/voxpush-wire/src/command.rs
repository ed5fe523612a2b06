use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::BytesMut;

use crate::field::{put_bytes_field, put_varint_field};
use crate::varint::put_varint;

/// Inner-message field numbers of the install command.
///
/// These apply to the *request* only. Replies use their own flat numbering
/// ([`crate::response::reply_fields`]); the two sides do not line up and the
/// device firmware is authoritative on both.
pub mod request_fields {
    pub const SET_ID: u32 = 1;
    pub const URL: u32 = 2;
    pub const CONTENT_HASH: u32 = 3;
    pub const VERSION: u32 = 4;
    pub const SIZE_BYTES: u32 = 5;
}

/// A voice pack install command.
///
/// Built once per push from the packaged bundle's metadata and consumed by
/// [`encode`](InstallRequest::encode); never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Pack id the device should install (501/502 are the official packs).
    pub set_id: u64,
    /// HTTP URL the device downloads the pack ZIP from.
    pub url: String,
    /// Hex digest of the ZIP, carried as ASCII text; the device compares
    /// the text form, not raw digest bytes.
    pub content_hash: String,
    /// Pack version. The device ignores versions at or below the one it has.
    pub version: u64,
    /// ZIP size in bytes.
    pub size_bytes: u64,
}

impl InstallRequest {
    /// Encode as the transport-ready datapoint string.
    ///
    /// Layout: `base64( varint(len(envelope)) ++ envelope )` with
    /// `envelope = field#1{bytes = inner} ++ field#2{bytes = ""}`. The empty
    /// outer field #2 must be present; some firmware revisions silently
    /// drop commands without it.
    pub fn encode(&self) -> String {
        let inner = self.encode_inner();

        let mut envelope = BytesMut::with_capacity(inner.len() + 8);
        put_bytes_field(&mut envelope, 1, &inner);
        put_bytes_field(&mut envelope, 2, b"");

        let mut framed = BytesMut::with_capacity(envelope.len() + 4);
        put_varint(&mut framed, envelope.len() as u64);
        framed.extend_from_slice(&envelope);

        STANDARD.encode(&framed)
    }

    /// The inner message: the five request fields in fixed order.
    pub fn encode_inner(&self) -> BytesMut {
        let mut inner = BytesMut::with_capacity(
            self.url.len() + self.content_hash.len() + 32,
        );
        put_varint_field(&mut inner, request_fields::SET_ID, self.set_id);
        put_bytes_field(&mut inner, request_fields::URL, self.url.as_bytes());
        put_bytes_field(
            &mut inner,
            request_fields::CONTENT_HASH,
            self.content_hash.as_bytes(),
        );
        put_varint_field(&mut inner, request_fields::VERSION, self.version);
        put_varint_field(&mut inner, request_fields::SIZE_BYTES, self.size_bytes);
        inner
    }
}
