use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use http_body_util::BodyExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use h1_wire::connection::ResponseWriter;
use h1_wire::handler::Handler;
use h1_wire::protocol::{HandlerError, Headers, Request, StatusCode};
use h1_wire::server::Server;

const DEFAULT_ADDRESS: &str = "127.0.0.1:42069";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let address = env::var("H1_WIRE_ADDR").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());
    let server = Server::builder().address(address.as_str()).build()?.bind().await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c"),
            Err(e) => error!(cause = %e, "failed to listen for ctrl-c"),
        }
        signal.cancel();
    });

    server.serve(Arc::new(SimpleHandler), shutdown).await;
    info!("server gracefully stopped");
    Ok(())
}

struct SimpleHandler;

#[async_trait]
impl Handler<OwnedReadHalf, OwnedWriteHalf> for SimpleHandler {
    async fn call(
        &self,
        request: Request<OwnedReadHalf>,
        writer: &mut ResponseWriter<OwnedWriteHalf>,
    ) -> Result<(), HandlerError> {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain")?;

        let target = request.target().to_owned();
        match target.as_str() {
            "/yourproblem" => {
                writer.write_status_line(StatusCode::BadRequest).await?;
                writer.write_headers(&headers)?;
                writer.write_body(b"Your problem is not my problem\n").await?;
            }
            "/myproblem" => {
                writer.write_status_line(StatusCode::InternalServerError).await?;
                writer.write_headers(&headers)?;
                writer.write_body(b"Woopsie, my bad\n").await?;
            }
            "/echo" => {
                // stream the request body back as a chunked response
                writer.write_status_line(StatusCode::Ok).await?;
                writer.write_headers(&headers)?;
                writer.declare_trailers(&["X-Content-Length"])?;
                writer.write_chunked_body(b"").await?;

                let mut body = request.into_body();
                let mut length = 0;
                while let Some(frame) = body.frame().await {
                    if let Ok(data) = frame?.into_data() {
                        length += data.len();
                        writer.write_chunked_body(&data).await?;
                    }
                }
                writer.set_trailer("X-Content-Length", &length.to_string())?;
                writer.write_chunked_body_done().await?;
            }
            _ => {
                writer.write_status_line(StatusCode::Ok).await?;
                writer.write_headers(&headers)?;
                writer.write_body(b"All good, frfr\n").await?;
            }
        }

        Ok(())
    }
}
