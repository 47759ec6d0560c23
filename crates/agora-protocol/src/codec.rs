//! # Framing
//!
//! One JSON document per line, terminated by `\n`. A frame that reaches
//! end-of-stream without a newline is still accepted so peers that close
//! their write half instead of sending a terminator interoperate.
//!
//! Reads are capped: a frame longer than the limit is rejected without
//! buffering the remainder.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::CodecError;

/// Largest frame accepted by default (1 MiB, excluding the newline).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Read one frame of at most `max_len` bytes and decode it as `T`.
pub async fn read_message<R, T>(reader: &mut R, max_len: usize) -> Result<T, CodecError>
where
    R: AsyncRead + Unpin + ?Sized,
    T: DeserializeOwned,
{
    // One byte of headroom for the terminator.
    let limit = (max_len as u64).saturating_add(1);
    let mut framed = BufReader::new((&mut *reader).take(limit));
    let mut buf = Vec::new();
    framed.read_until(b'\n', &mut buf).await?;

    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > max_len {
        return Err(CodecError::TooLarge { limit: max_len });
    }
    if buf.iter().all(u8::is_ascii_whitespace) {
        return Err(CodecError::Closed);
    }
    Ok(serde_json::from_slice(&buf)?)
}

/// Encode `msg` as one frame and flush it.
pub async fn write_message<W, T>(writer: &mut W, msg: &T) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize + ?Sized,
{
    let mut buf = serde_json::to_vec(msg)?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
