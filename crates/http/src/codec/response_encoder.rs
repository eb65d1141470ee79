//! HTTP response encoder.
//!
//! [`ResponseEncoder`] is the write-side state machine. It encodes into a [`BytesMut`] and
//! never touches I/O; [`ResponseWriter`](crate::connection::ResponseWriter) binds it to a sink.
//!
//! Header fields are collected until the first body write, because writing the body may add
//! `Content-Length`, `Transfer-Encoding` or `Connection`. The header section is then emitted
//! exactly once, followed by the body in the framing the call asked for:
//!
//! ```text
//! status_line -> headers -> body                            -> Complete
//!                        \-> chunk, chunk, ... -> chunked_done -> Complete
//! ```

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

use crate::codec::body::ChunkedEncoder;
use crate::codec::header::{HeaderEncoder, StatusLineEncoder};
use crate::ensure;
use crate::protocol::header::{is_chunked, is_token};
use crate::protocol::{HeaderError, Headers, PayloadItem, StatusCode, WriteError, WriteEvent, WriteState};

const CONTENT_TYPE: &str = "content-type";
const CONTENT_LENGTH: &str = "content-length";
const TRANSFER_ENCODING: &str = "transfer-encoding";
const CONNECTION: &str = "connection";
const TRAILER: &str = "trailer";

#[derive(Debug)]
pub struct ResponseEncoder {
    state: WriteState,
    headers: Headers,
    declared_trailers: Vec<String>,
    trailers: Headers,
    chunked_encoder: ChunkedEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Header fields collected so far, including the ones a body write adds.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    fn advance(&mut self, next: WriteState) {
        debug!(from = %self.state, to = %next, "response writer advanced");
        self.state = next;
    }

    pub fn status_line(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), WriteError> {
        let next = self.state.on(WriteEvent::StatusLine)?;
        StatusLineEncoder.encode(status, dst)?;
        self.advance(next);
        Ok(())
    }

    /// Folds `extra` into the pending header fields. Nothing is encoded until the body is written.
    pub fn write_headers(&mut self, extra: &Headers) -> Result<(), WriteError> {
        let next = self.state.on(WriteEvent::Headers)?;
        for (name, value) in extra {
            self.headers.append(name, value)?;
        }
        self.advance(next);
        Ok(())
    }

    /// Announces trailer fields with a `Trailer` header. Only allowed before the body starts.
    pub fn declare_trailers(&mut self, names: &[&str]) -> Result<(), WriteError> {
        ensure!(self.state == WriteState::AwaitingBody, WriteError::invalid_state(WriteState::AwaitingBody, self.state));

        for name in names {
            ensure!(!name.is_empty(), HeaderError::EmptyName.into());
            ensure!(is_token(name), HeaderError::InvalidName { name: name.to_string() }.into());
        }

        for name in names {
            let name = name.to_ascii_lowercase();
            if !self.declared_trailers.contains(&name) {
                self.declared_trailers.push(name);
            }
        }

        if !self.declared_trailers.is_empty() {
            self.headers.insert(TRAILER, &self.declared_trailers.join(", "))?;
        }
        Ok(())
    }

    /// Sets the value of a declared trailer field.
    pub fn set_trailer(&mut self, name: &str, value: &str) -> Result<(), WriteError> {
        ensure!(self.state != WriteState::Complete, WriteError::invalid_state(WriteState::AwaitingBody, self.state));
        ensure!(
            self.declared_trailers.iter().any(|declared| declared.eq_ignore_ascii_case(name)),
            WriteError::UndeclaredTrailer { name: name.to_string() }
        );

        self.trailers.insert(name, value)?;
        Ok(())
    }

    /// Encodes the header section, `data` as a fixed-length body and any trailer values.
    pub fn body(&mut self, data: &[u8], dst: &mut BytesMut) -> Result<(), WriteError> {
        let next = self.state.on(WriteEvent::Body)?;
        ensure!(self.headers.contains(CONTENT_TYPE), WriteError::MissingContentType);

        if !self.headers.contains(TRANSFER_ENCODING) {
            self.headers.insert(CONTENT_LENGTH, &data.len().to_string())?;
        }
        if !self.headers.contains(CONNECTION) {
            self.headers.insert(CONNECTION, "close")?;
        }

        HeaderEncoder.encode(&self.headers, dst)?;
        dst.extend_from_slice(data);
        if !self.trailers.is_empty() {
            HeaderEncoder.encode(&self.trailers, dst)?;
        }

        trace!(len = data.len(), "encoded fixed length body");
        self.advance(next);
        Ok(())
    }

    /// Encodes one chunk, preceded by the header section on the first call.
    pub fn chunk(&mut self, data: &[u8], dst: &mut BytesMut) -> Result<(), WriteError> {
        let next = self.state.on(WriteEvent::Chunk)?;
        ensure!(self.headers.contains(CONTENT_TYPE), WriteError::MissingContentType);

        if self.state == WriteState::AwaitingBody {
            if let Some(codings) = self.headers.get(TRANSFER_ENCODING) {
                ensure!(is_chunked(codings), WriteError::NotChunked { transfer_encoding: codings.to_string() });
            } else {
                self.headers.insert(TRANSFER_ENCODING, "chunked")?;
            }
            self.headers.remove(CONTENT_LENGTH);
            if !self.headers.contains(CONNECTION) {
                self.headers.insert(CONNECTION, "close")?;
            }
            HeaderEncoder.encode(&self.headers, dst)?;
        }

        self.chunked_encoder.encode(PayloadItem::Chunk(data), dst)?;

        trace!(len = data.len(), "encoded chunk");
        self.advance(next);
        Ok(())
    }

    /// Encodes the last chunk, the trailer values and the terminating empty line.
    pub fn chunked_done(&mut self, dst: &mut BytesMut) -> Result<(), WriteError> {
        let next = self.state.on(WriteEvent::ChunkedDone)?;

        self.chunked_encoder.encode(PayloadItem::<&[u8]>::Eof, dst)?;
        HeaderEncoder.encode(&self.trailers, dst)?;

        self.advance(next);
        Ok(())
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self {
            state: WriteState::AwaitingStatusLine,
            headers: Headers::new(),
            declared_trailers: Vec::new(),
            trailers: Headers::new(),
            chunked_encoder: ChunkedEncoder::new(),
        }
    }
}
