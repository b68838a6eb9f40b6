use bytes::{Buf, BytesMut};
use std::io::Cursor;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::resp::*;

/// Most bytes buffered while waiting for one frame to complete.
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Reads and writes RESP frames over a TCP stream.
pub struct Connection {
    stream: BufWriter<TcpStream>,
    buffer: BytesMut,
    max_frame_size: usize,
}

impl Connection {
    pub fn new(socket: TcpStream) -> Self {
        Self::with_max_frame_size(socket, MAX_FRAME_SIZE)
    }

    /// A connection that gives up on any frame larger than `max_frame_size`.
    pub fn with_max_frame_size(socket: TcpStream, max_frame_size: usize) -> Self {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(4096),
            max_frame_size,
        }
    }

    /// Waits for the next full frame. `Ok(None)` means the peer closed the
    /// connection cleanly between frames.
    ///
    /// Malformed or oversized input is an error; the buffered bytes are then
    /// unusable and the connection should be dropped.
    pub async fn read_frame(&mut self) -> crate::Result<Option<RESPType>> {
        loop {
            let mut buf = Cursor::new(&self.buffer[..]);
            if let Some(frame) = RESPParser::parse(&mut buf)? {
                let consumed = buf.position() as usize;
                self.buffer.advance(consumed);
                return Ok(Some(frame));
            }

            if self.buffer.len() >= self.max_frame_size {
                return Err(format!("frame exceeds {} bytes", self.max_frame_size).into());
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                } else {
                    return Err("connection reset by peer".into());
                }
            }
        }
    }

    pub async fn write_frame(&mut self, frame: &RESPType) -> crate::Result<()> {
        let bytes = RESPSerializer::serialize(frame)?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
