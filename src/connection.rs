// ABOUTME: Buffered line I/O over the modem byte stream
// ABOUTME: LineReader reassembles `\n`-terminated frames, CommandWriter emits `AT<body>\r`

use crate::frame;
use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::trace;

/// Read half of a modem connection
///
/// Wraps any `AsyncRead` (a serial port, a TCP bridge, an in-memory duplex)
/// with a read buffer. Lines split across reads are held back until their
/// terminator arrives.
#[derive(Debug)]
pub struct LineReader<R> {
    stream: R,

    // Bytes read from the stream but not yet returned as a line
    buffer: BytesMut,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(stream: R) -> Self {
        Self::with_capacity(stream, 1024)
    }

    pub fn with_capacity(stream: R, capacity: usize) -> Self {
        LineReader {
            stream,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Read the next non-empty line from the stream.
    ///
    /// Any data remaining in the buffer after the line is kept there for the
    /// next call to `read_line`.
    ///
    /// # Returns
    ///
    /// On success, the line is returned without its terminator. If the stream
    /// is closed on a line boundary, `None` is returned. If it closes with a
    /// partial line buffered, an error is returned.
    pub async fn read_line(&mut self) -> crate::Result<Option<String>> {
        loop {
            while let Some(line) = frame::parse_line(&mut self.buffer) {
                if !line.is_empty() {
                    return Ok(Some(line));
                }
            }

            if !self.buffer.is_empty() {
                trace!(
                    "buffered partial frame: {:?}",
                    String::from_utf8_lossy(&self.buffer)
                );
            }

            // `0` indicates "end of stream"
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return self
                    .buffer
                    .is_empty()
                    .then_some(None)
                    .ok_or_else(|| "connection reset by peer".into());
            }
        }
    }
}

/// Write half of a modem connection
#[derive(Debug)]
pub struct CommandWriter<W> {
    // Buffered so each command goes out in a single flush
    stream: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> CommandWriter<W> {
    pub fn new(stream: W) -> Self {
        CommandWriter {
            stream: BufWriter::new(stream),
        }
    }

    /// Write `AT` + `body` + `\r` and flush it to the stream
    pub async fn write_command(&mut self, body: &str) -> io::Result<()> {
        self.stream.write_all(b"AT").await?;
        self.stream.write_all(body.as_bytes()).await?;
        self.stream.write_all(b"\r").await?;
        self.stream.flush().await
    }

    /// Flush and shut down the write side
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
