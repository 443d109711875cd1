//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur during protocol operations.
///
/// None of these are fatal: every codec and registry operation fails locally
/// and leaves no partial state behind. The transport or application decides
/// whether to retry, drop the connection, or surface the error.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Header buffer too short or the magic tag does not match.
    #[error("malformed header")]
    MalformedHeader,

    /// Type id outside the registered range at dispatch time.
    #[error("unknown message type: {0}")]
    UnknownType(u32),

    /// The registry refuses to allocate this type id (reserved/unassigned).
    #[error("cannot allocate message type: {0}")]
    AllocationRefused(u32),

    /// Payload decode expected an object-shaped root and did not get one.
    #[error("payload root is not an object")]
    PayloadNotObject,

    /// The payload bytes are not a valid hierarchical value.
    #[error("payload parse failed: {0}")]
    PayloadParse(#[from] serde_json::Error),

    /// Encoded payload exceeds the maximum allowed size.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: u32, max: u32 },

    /// Buffer ends before the declared frame does.
    #[error("incomplete message: expected {expected} bytes, got {received}")]
    IncompleteMessage { expected: usize, received: usize },

    /// IO error while reading or writing a frame.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
