//! Core HTTP protocol types.
//!
//! # Architecture
//!
//! - **Headers** ([`header`]): [`Headers`], the case-insensitive header collection that folds
//!   repeated names
//! - **Message framing**: [`PayloadItem`] and [`BodyDecodeMode`]
//! - **Requests**: [`RequestLine`], [`Request`] and the [`ParseState`] machine
//! - **Responses**: [`StatusCode`] and the [`WriteState`] machine
//! - **Body streaming** ([`body`]): [`ReqBody`](body::ReqBody), implementing `http_body::Body`
//! - **Errors**: [`HttpError`], [`ParseError`], [`WriteError`], [`HeaderError`]
//!
//! Both state machines are plain enums with a pure transition function; the codec layer
//! drives them.

pub mod header;
pub use header::Headers;

mod message;
pub use message::BodyDecodeMode;
pub use message::PayloadItem;

mod request;
pub(crate) use request::ParseEvent;
pub use request::ParseState;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub(crate) use response::WriteEvent;
pub use response::StatusCode;
pub use response::WriteState;

mod error;
pub use error::HandlerError;
pub use error::HeaderError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::WriteError;

pub mod body;
