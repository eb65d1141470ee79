//! Append-only byte accumulator used on the read path.
//!
//! The buffer owns one contiguous allocation. `filled` bytes at the front are unconsumed
//! input; the rest is free capacity that the next read fills. Capacity only ever doubles,
//! and consuming bytes compacts the remainder back to offset 0, so callers never observe a
//! slice that outlives a growth step.

use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};
use tracing::trace;

/// Initial capacity used by [`GrowableBuffer::new`].
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct GrowableBuffer {
    storage: Vec<u8>,
    filled: usize,
}

impl GrowableBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a buffer with the given starting capacity (at least one byte).
    pub fn with_capacity(capacity: usize) -> Self {
        Self { storage: vec![0; capacity.max(1)], filled: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of buffered, unconsumed bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// The unconsumed bytes, starting at offset 0.
    #[inline]
    pub fn filled(&self) -> &[u8] {
        &self.storage[..self.filled]
    }

    /// Reads as many bytes as `src` has ready into free capacity, doubling the capacity
    /// first if the buffer is full. Returns the number of bytes read; 0 means end of stream.
    pub fn poll_append<R>(&mut self, cx: &mut Context<'_>, src: Pin<&mut R>) -> Poll<io::Result<usize>>
    where
        R: AsyncRead + ?Sized,
    {
        if self.filled == self.capacity() {
            self.grow();
        }

        let mut read_buf = ReadBuf::new(&mut self.storage[self.filled..]);
        ready!(src.poll_read(cx, &mut read_buf))?;
        let n = read_buf.filled().len();
        self.filled += n;

        trace!(read = n, filled = self.filled, capacity = self.capacity(), "append to buffer");
        Poll::Ready(Ok(n))
    }

    /// Async form of [`poll_append`](Self::poll_append).
    pub async fn append<R>(&mut self, src: &mut R) -> io::Result<usize>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        poll_fn(|cx| self.poll_append(cx, Pin::new(&mut *src))).await
    }

    /// Copies `data` in, doubling capacity as many times as needed.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        while self.capacity() - self.filled < data.len() {
            self.grow();
        }
        self.storage[self.filled..self.filled + data.len()].copy_from_slice(data);
        self.filled += data.len();
    }

    /// Drops the first `n` bytes and shifts the rest to offset 0.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than [`len`](Self::len).
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.filled, "cannot consume {n} bytes, only {} buffered", self.filled);
        if n == 0 {
            return;
        }
        self.storage.copy_within(n..self.filled, 0);
        self.filled -= n;
    }

    /// Copies the first `n` bytes out and consumes them.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than [`len`](Self::len).
    pub fn split_to(&mut self, n: usize) -> Bytes {
        let bytes = Bytes::copy_from_slice(&self.filled()[..n]);
        self.consume(n);
        bytes
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity() * 2;
        trace!(from = self.capacity(), to = new_capacity, "grow buffer");
        self.storage.resize(new_capacity, 0);
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}
