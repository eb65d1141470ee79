use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, trace};

use crate::codec::ResponseEncoder;
use crate::protocol::{Headers, StatusCode, WriteError, WriteState};

const INIT_BUFFER_SIZE: usize = 4 * 1024;

/// Writes one response to an async byte sink.
///
/// Calls must follow `write_status_line`, `write_headers`, then either `write_body` or
/// `write_chunked_body` repeated and closed by `write_chunked_body_done`. Any other order is
/// rejected with [`WriteError::InvalidWriterState`] before a byte is written.
///
/// Every call that produces bytes flushes them to the sink before returning. After a failed
/// write the writer is poisoned: later calls fail with a broken pipe error and write nothing.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
    poisoned: bool,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, INIT_BUFFER_SIZE)
    }

    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new(), poisoned: false }
    }

    pub fn state(&self) -> WriteState {
        self.encoder.state()
    }

    /// Header fields collected so far.
    pub fn headers(&self) -> &Headers {
        self.encoder.headers()
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.check_poisoned()?;
        self.encoder.status_line(status, &mut self.buffer)?;
        self.flush().await
    }

    pub fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.encoder.write_headers(headers)
    }

    pub fn declare_trailers(&mut self, names: &[&str]) -> Result<(), WriteError> {
        self.encoder.declare_trailers(names)
    }

    pub fn set_trailer(&mut self, name: &str, value: &str) -> Result<(), WriteError> {
        self.encoder.set_trailer(name, value)
    }

    pub async fn write_body(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.check_poisoned()?;
        self.encoder.body(data, &mut self.buffer)?;
        self.flush().await
    }

    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.check_poisoned()?;
        self.encoder.chunk(data, &mut self.buffer)?;
        self.flush().await
    }

    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.check_poisoned()?;
        self.encoder.chunked_done(&mut self.buffer)?;
        self.flush().await
    }

    /// Shuts down the write half of the sink.
    pub async fn shutdown(&mut self) -> Result<(), WriteError> {
        self.check_poisoned()?;
        self.writer.shutdown().await?;
        Ok(())
    }

    fn check_poisoned(&self) -> Result<(), WriteError> {
        if self.poisoned {
            return Err(WriteError::io(io::ErrorKind::BrokenPipe));
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), WriteError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let result = match self.writer.write_all(&self.buffer).await {
            Ok(()) => self.writer.flush().await,
            Err(e) => Err(e),
        };
        let len = self.buffer.len();
        self.buffer.clear();

        match result {
            Ok(()) => {
                trace!(len, "flushed response bytes");
                Ok(())
            }
            Err(e) => {
                error!(cause = %e, "failed to write response");
                self.poisoned = true;
                Err(e.into())
            }
        }
    }
}
