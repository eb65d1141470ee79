use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use tokio::io::AsyncRead;
use tracing::{debug, trace};

use crate::codec::GrowableBuffer;
use crate::codec::body::PayloadDecoder;
use crate::protocol::{BodyDecodeMode, Headers, ParseError, ParseEvent, ParseState, PayloadItem};

/// The body of a [`Request`](crate::protocol::Request), read lazily from the connection.
///
/// `ReqBody` owns the read half of the connection together with the bytes already buffered
/// past the header section. Each poll decodes what is buffered and only reads from the
/// source when the decoder needs more data, so at most one buffer of body is held in memory.
///
/// The body is single-pass: once it has reported its end (or an error) it yields nothing more.
/// Trailer fields of a chunked body are delivered as a final trailers frame.
#[derive(Debug)]
pub struct ReqBody<R> {
    source: R,
    buffer: GrowableBuffer,
    decoder: PayloadDecoder,
    mode: BodyDecodeMode,
    state: ParseState,
    errored: bool,
    trailers: Option<Headers>,
}

impl<R> ReqBody<R> {
    pub(crate) fn new(source: R, buffer: GrowableBuffer, mode: BodyDecodeMode) -> Self {
        Self {
            source,
            buffer,
            decoder: mode.into(),
            mode,
            state: if mode.is_none() { ParseState::Complete } else { ParseState::ReadingBody },
            errored: false,
            trailers: None,
        }
    }

    /// The framing chosen when the header section ended.
    pub fn mode(&self) -> BodyDecodeMode {
        self.mode
    }

    /// `Complete` once the body was read to its end, `ReadingBody` before that.
    pub fn state(&self) -> ParseState {
        self.state
    }

    fn fail(&mut self, e: ParseError) -> Poll<Option<Result<Frame<Bytes>, ParseError>>> {
        debug!(cause = %e, "request body failed");
        self.errored = true;
        Poll::Ready(Some(Err(e)))
    }
}

impl<R> Body for ReqBody<R>
where
    R: AsyncRead + Unpin,
{
    type Data = Bytes;
    type Error = ParseError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        loop {
            if this.errored {
                return Poll::Ready(None);
            }

            if this.state == ParseState::Complete {
                let frame = this.trailers.take().map(|trailers| {
                    trailers.to_header_map().map(Frame::trailers).map_err(ParseError::from)
                });
                return Poll::Ready(frame);
            }

            match this.decoder.decode(&mut this.buffer) {
                Ok(Some(PayloadItem::Chunk(bytes))) => {
                    trace!(len = bytes.len(), "read request body bytes");
                    return Poll::Ready(Some(Ok(Frame::data(bytes))));
                }
                Ok(Some(PayloadItem::Eof)) => {
                    let Some(next) = this.state.on(ParseEvent::BodyFinished) else {
                        let e = ParseError::InvalidState { state: this.state };
                        return this.fail(e);
                    };
                    debug!(mode = ?this.mode, "request body finished");
                    this.state = next;
                    this.trailers = this.decoder.take_trailers();
                    continue;
                }
                Ok(None) => {}
                Err(e) => return this.fail(e),
            }

            match ready!(this.buffer.poll_append(cx, Pin::new(&mut this.source))) {
                Ok(0) => {
                    let e = this.decoder.eof_error();
                    return this.fail(e);
                }
                Ok(_) => {}
                Err(e) => return this.fail(e.into()),
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.errored || (self.state == ParseState::Complete && self.trailers.is_none())
    }

    fn size_hint(&self) -> SizeHint {
        match self.decoder.mode() {
            BodyDecodeMode::None => SizeHint::with_exact(0),
            BodyDecodeMode::FixedLength(remaining) => SizeHint::with_exact(remaining),
            BodyDecodeMode::Chunked => SizeHint::default(),
        }
    }
}
