//! Request handlers.
//!
//! A [`Handler`] receives the parsed [`Request`] by value together with the connection's
//! [`ResponseWriter`], and writes exactly one response. The request, and with it the read half
//! of the connection, is dropped when the handler returns.
//!
//! Plain functions become handlers through [`make_handler`]. Because the returned future
//! borrows the writer, such functions return a [`BoxFuture`]:
//!
//! ```no_run
//! use futures::future::BoxFuture;
//! use h1_wire::connection::ResponseWriter;
//! use h1_wire::handler::make_handler;
//! use h1_wire::protocol::{HandlerError, Headers, Request, StatusCode};
//! use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
//!
//! fn hello(_request: Request<OwnedReadHalf>, writer: &mut ResponseWriter<OwnedWriteHalf>) -> BoxFuture<'_, Result<(), HandlerError>> {
//!     Box::pin(async move {
//!         let mut headers = Headers::new();
//!         headers.insert("Content-Type", "text/plain")?;
//!
//!         writer.write_status_line(StatusCode::Ok).await?;
//!         writer.write_headers(&headers)?;
//!         writer.write_body(b"Hello World!\n").await?;
//!         Ok(())
//!     })
//! }
//!
//! let handler = make_handler(hello);
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::connection::ResponseWriter;
use crate::protocol::{HandlerError, Request};

#[async_trait]
pub trait Handler<R, W>: Send + Sync {
    async fn call(&self, request: Request<R>, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>;
}

/// A [`Handler`] backed by a function.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<R, W, F> Handler<R, W> for HandlerFn<F>
where
    R: Send + 'static,
    W: Send + 'static,
    F: for<'a> Fn(Request<R>, &'a mut ResponseWriter<W>) -> BoxFuture<'a, Result<(), HandlerError>> + Send + Sync,
{
    async fn call(&self, request: Request<R>, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError> {
        (self.f)(request, writer).await
    }
}

pub fn make_handler<F, R, W>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(Request<R>, &'a mut ResponseWriter<W>) -> BoxFuture<'a, Result<(), HandlerError>>,
{
    HandlerFn { f }
}
