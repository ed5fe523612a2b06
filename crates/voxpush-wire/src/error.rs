/// Errors that can occur while encoding or decoding wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A varint or length-delimited read ran past the end of the buffer.
    #[error("truncated payload (ran out of bytes at offset {offset})")]
    Truncated { offset: usize },

    /// A field used a wire type this protocol never produces.
    #[error("unsupported wire type {wire_type} on field {field}")]
    UnsupportedWireType { wire_type: u8, field: u32 },

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, WireError>;
