//! A loopback HTTP server that replays one canned response.
//!
//! Every connection gets the same response. Bodies can be split into chunks
//! with a pause between them to simulate slow links. Responses are
//! close-delimited, so omitting `Content-Length` leaves the length unknown
//! to the client.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the server sends back.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: u16,
    headers: Vec<(String, String)>,
    chunks: Vec<Vec<u8>>,
    chunk_delay: Duration,
}

impl CannedResponse {
    /// `200 OK` with `body` and a matching `Content-Length`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self {
            status: 200,
            headers: vec![("Content-Length".to_string(), body.len().to_string())],
            chunks: vec![body],
            chunk_delay: Duration::ZERO,
        }
    }

    /// `200 OK` with `body` and no `Content-Length`.
    pub fn unsized_body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            chunks: vec![body.into()],
            chunk_delay: Duration::ZERO,
        }
    }

    /// An empty response with `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: vec![("Content-Length".to_string(), "0".to_string())],
            chunks: Vec::new(),
            chunk_delay: Duration::ZERO,
        }
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send the body `chunk_size` bytes at a time, pausing `delay` before each.
    #[must_use]
    pub fn trickled(mut self, chunk_size: usize, delay: Duration) -> Self {
        let body: Vec<u8> = self.chunks.concat();
        self.chunks = body.chunks(chunk_size.max(1)).map(<[u8]>::to_vec).collect();
        self.chunk_delay = delay;
        self
    }

    fn head(&self) -> String {
        let reason = match self.status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let mut head = format!("HTTP/1.1 {} {reason}\r\n", self.status);
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("Connection: close\r\n\r\n");
        head
    }
}

/// Serves a [`CannedResponse`] on `127.0.0.1` until dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral port and start answering.
    pub async fn start(response: CannedResponse) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, &response).await;
                });
            }
        });
        Ok(Self {
            addr,
            handle,
        })
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(mut stream: TcpStream, response: &CannedResponse) -> std::io::Result<()> {
    // Drain the request head; the body of a GET is empty
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    stream.write_all(response.head().as_bytes()).await?;
    stream.flush().await?;
    for chunk in &response.chunks {
        if !response.chunk_delay.is_zero() {
            tokio::time::sleep(response.chunk_delay).await;
        }
        stream.write_all(chunk).await?;
        stream.flush().await?;
    }
    stream.shutdown().await
}
