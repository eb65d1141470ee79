use bytes::{Buf, Bytes};

/// Represents an item in an HTTP message payload stream.
///
/// Decoders produce either data chunks or signal the end of the payload (EOF);
/// encoders consume the same items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// How the request body is framed on the wire.
///
/// Chosen once, right after the header section ends, and never changed afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyDecodeMode {
    /// No body follows the header section
    None,
    /// `Content-Length: n`
    FixedLength(u64),
    /// `Transfer-Encoding: chunked`
    Chunked,
}

impl BodyDecodeMode {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, BodyDecodeMode::Chunked)
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, BodyDecodeMode::None)
    }
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
