use voxpush_wire::WireError;

/// Errors raised by transport implementations.
///
/// The push flow never constructs these itself (other than wrapping); it
/// surfaces them unchanged. Retry and timeout policy belong to the
/// implementation behind [`crate::DeviceTransport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The local session is unusable (cannot connect, key rejected, bridge
    /// process failed, ...).
    #[error("device transport unavailable: {reason}")]
    Unavailable { reason: String },

    /// An I/O error from the underlying session.
    #[error("device transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while pushing a pack.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error, surfaced unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The device replied, but its payload does not decode.
    #[error("malformed device reply: {0}")]
    MalformedReply(#[from] WireError),

    /// The reply value for a datapoint was not the expected string.
    #[error("reply for datapoint {dp} is not a string")]
    UnexpectedValue { dp: u32 },
}

pub type Result<T> = std::result::Result<T, DeviceError>;
