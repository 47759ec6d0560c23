//! Transport abstraction.

use tokio::io::{AsyncRead, AsyncWrite};

/// A reliable, ordered, bidirectional byte stream carrying one request and
/// one response. Closing is `AsyncWriteExt::shutdown`.
///
/// Implemented for every `AsyncRead + AsyncWrite + Unpin + Send` type:
/// `TcpStream`, `tokio::io::DuplexStream`, and P2P substream adapters.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Stream for T where T: AsyncRead + AsyncWrite + Unpin + Send + ?Sized {}
