//! Protocol and framing errors.

use thiserror::Error;

/// Errors reading or writing one framed message.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The peer closed the stream without sending a message.
    #[error("stream closed before a message was received")]
    Closed,

    /// The message exceeded the configured size limit.
    #[error("message exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to a client by [`send_request`](crate::send_request).
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The response answers a different request.
    #[error("response requestID {got:?} does not match request {expected:?}")]
    RequestIdMismatch { expected: String, got: String },
}
