// ABOUTME: Byte-stream seam consumed by the modem engine
// ABOUTME: Any tokio duplex stream (serial port, TCP bridge, in-memory pipe) qualifies

use tokio::io::{AsyncRead, AsyncWrite};

/// A duplex byte stream the engine can own
///
/// Port discovery and opening happen outside the crate; the engine only
/// needs something it can split into read and write halves and move into a
/// background task. Implemented for every qualifying type.
pub trait ByteStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}
