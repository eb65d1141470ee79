use std::hint::black_box;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use futures::future::BoxFuture;
use h1_wire::codec::body::ChunkedDecoder;
use h1_wire::codec::{GrowableBuffer, RequestDecoder, ResponseEncoder, read_request};
use h1_wire::connection::{HttpConnection, ResponseWriter};
use h1_wire::handler::make_handler;
use h1_wire::protocol::{HandlerError, Headers, Request, StatusCode};
use http_body_util::BodyExt;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::runtime::Runtime;

// Mock IO for benchmarking
#[derive(Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

fn hello_handler(_request: Request<MockIO>, writer: &mut ResponseWriter<MockIO>) -> BoxFuture<'_, Result<(), HandlerError>> {
    Box::pin(async move {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain")?;
        writer.write_status_line(StatusCode::Ok).await?;
        writer.write_headers(&headers)?;
        writer.write_body(b"Hello World!").await?;
        Ok(())
    })
}

fn chunked_payload(chunks: usize, chunk_size: usize) -> Vec<u8> {
    let mut payload = Vec::new();
    for _ in 0..chunks {
        payload.extend(format!("{chunk_size:x}\r\n").into_bytes());
        payload.extend(std::iter::repeat_n(b'a', chunk_size));
        payload.extend(b"\r\n");
    }
    payload.extend(b"0\r\n\r\n");
    payload
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: bench\r\nAccept: */*\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            black_box(decoder.parse(black_box(&request[..])).unwrap());
        });
    });
}

fn bench_chunked_decoder(c: &mut Criterion) {
    let payload = chunked_payload(64, 1024);

    c.bench_function("decode_chunked_body", |b| {
        b.iter(|| {
            let mut buffer = GrowableBuffer::new();
            buffer.extend_from_slice(&payload);
            let mut decoder = ChunkedDecoder::new();
            while let Some(item) = decoder.decode(&mut buffer).unwrap() {
                if item.is_eof() {
                    break;
                }
                black_box(item);
            }
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let mut headers = Headers::new();
    headers.insert("Content-Type", "text/plain").unwrap();

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.status_line(StatusCode::Ok, &mut bytes).unwrap();
            encoder.write_headers(&headers).unwrap();
            encoder.body(b"Hello World!", &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_read_request(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut request = b"POST /submit HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    request.extend(chunked_payload(16, 256));

    c.bench_function("read_chunked_request", |b| {
        b.to_async(&runtime).iter(|| async {
            let request = read_request(MockIO::new(request.clone()), 8 * 1024).await.unwrap();
            black_box(request.into_body().collect().await.unwrap().to_bytes());
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let handler = Arc::new(make_handler(hello_handler));

    c.bench_function("process_simple_request", |b| {
        b.to_async(&runtime).iter(|| async {
            let mock_io = MockIO::new(request.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            black_box(connection.process(Arc::clone(&handler)).await.unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_request_decoder,
    bench_chunked_decoder,
    bench_response_encoder,
    bench_read_request,
    bench_http_connection
);
criterion_main!(benches);
