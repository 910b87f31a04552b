//! Length-prefixed JSON framing
//!
//! Every frame is a 4-byte little-endian unsigned length followed by that
//! many bytes of UTF-8 JSON. Decoding is two-phase: the envelope is read
//! first to learn the discriminant tag, then the payload is decoded into
//! the schema that tag selects.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::protocol::{ClientMsg, ServerMsg};

/// Frames larger than this are a protocol violation and disconnect the peer
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

const LEN_PREFIX_BYTES: usize = 4;

/// Transport-level framing errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_BYTES} byte limit")]
    TooLarge(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Payload-level decode errors; recoverable, the frame is just dropped
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not a tagged JSON object: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("unknown message tag `{0}`")]
    UnknownTag(String),

    #[error("malformed `{tag}` payload: {source}")]
    Payload {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Only the discriminant, decoded before committing to a schema
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
}

/// Decode one client frame payload
pub fn decode_client(payload: &[u8]) -> Result<ClientMsg, DecodeError> {
    let envelope: Envelope = serde_json::from_slice(payload).map_err(DecodeError::Envelope)?;

    if !ClientMsg::is_known_tag(&envelope.tag) {
        return Err(DecodeError::UnknownTag(envelope.tag));
    }

    serde_json::from_slice(payload).map_err(|source| DecodeError::Payload {
        tag: envelope.tag,
        source,
    })
}

/// Encode a server message into a ready-to-send frame
pub fn encode(msg: &ServerMsg) -> Result<Bytes, serde_json::Error> {
    let payload = serde_json::to_vec(msg)?;
    let mut frame = BytesMut::with_capacity(LEN_PREFIX_BYTES + payload.len());
    frame.put_u32_le(payload.len() as u32);
    frame.put_slice(&payload);
    Ok(frame.freeze())
}

/// Reads length-prefixed frames off one half of a socket
pub struct FrameReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read one complete frame payload. Errors are fatal for the connection.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>, FrameError> {
        let mut len_buf = [0u8; LEN_PREFIX_BYTES];
        self.inner.read_exact(&mut len_buf).await?;

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_BYTES {
            return Err(FrameError::TooLarge(len));
        }

        let mut payload = vec![0u8; len];
        self.inner.read_exact(&mut payload).await?;
        Ok(payload)
    }
}
