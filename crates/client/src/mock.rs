//! Minimal HTTP/1.1 mock servers for client tests.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A request as received by a mock server.
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// How a mock server answers one connection.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Reads the request, then answers with `status` and a JSON body.
    Json { status: String, body: String },
    /// Reads the request, then closes the connection without answering.
    Hangup,
    /// Reads the request and never answers.
    Silent,
    /// Sends `200 OK` headers declaring `declared` body bytes, writes only
    /// `sent`, then stalls.
    StalledBody { declared: usize, sent: String },
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Json {
            status: "200 OK".into(),
            body: body.into(),
        }
    }

    pub fn status(status: &str, body: &str) -> Self {
        Reply::Json {
            status: status.into(),
            body: body.into(),
        }
    }
}

/// Running mock server. `addr` is `host:port`.
pub(crate) struct MockServer {
    pub addr: String,
    pub requests: mpsc::UnboundedReceiver<CapturedRequest>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Serves one connection per reply, in order.
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, requests) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            for reply in replies {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let Ok(request) = read_request(&mut stream).await else {
                    continue;
                };
                let _ = tx.send(request);

                match reply {
                    Reply::Json { status, body } => {
                        let resp = format!(
                            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = stream.write_all(resp.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                    Reply::Hangup => drop(stream),
                    Reply::Silent => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        drop(stream);
                    }
                    Reply::StalledBody { declared, sent } => {
                        let resp = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {declared}\r\n\r\n{sent}"
                        );
                        let _ = stream.write_all(resp.as_bytes()).await;
                        let _ = stream.flush().await;
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        drop(stream);
                    }
                }
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub async fn next_request(&mut self) -> CapturedRequest {
        self.requests.recv().await.expect("mock server saw no request")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Reads one request, decoding a chunked or fixed-length body.
async fn read_request(stream: &mut TcpStream) -> io::Result<CapturedRequest> {
    let mut raw = Vec::new();
    let head_end = loop {
        if let Some(pos) = find(&raw, b"\r\n\r\n") {
            break pos + 4;
        }
        fill(stream, &mut raw).await?;
    };

    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let mut rest = raw.split_off(head_end);
    let lower = head.to_ascii_lowercase();

    let body = if lower.contains("transfer-encoding: chunked") {
        read_chunked(stream, rest).await?
    } else if let Some(len) = content_length(&lower) {
        while rest.len() < len {
            fill(stream, &mut rest).await?;
        }
        rest.truncate(len);
        rest
    } else {
        Vec::new()
    };

    Ok(CapturedRequest { head, body })
}

async fn read_chunked(stream: &mut TcpStream, mut raw: Vec<u8>) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut pos = 0;
    loop {
        let line_end = loop {
            if let Some(i) = find(&raw[pos..], b"\r\n") {
                break pos + i;
            }
            fill(stream, &mut raw).await?;
        };
        let size_line = String::from_utf8_lossy(&raw[pos..line_end]).into_owned();
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let data_start = line_end + 2;
        while raw.len() < data_start + size + 2 {
            fill(stream, &mut raw).await?;
        }
        if size == 0 {
            return Ok(body);
        }
        body.extend_from_slice(&raw[data_start..data_start + size]);
        pos = data_start + size + 2;
    }
}

async fn fill(stream: &mut TcpStream, buf: &mut Vec<u8>) -> io::Result<()> {
    let mut chunk = [0u8; 8192];
    let n = stream.read(&mut chunk).await?;
    if n == 0 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    buf.extend_from_slice(&chunk[..n]);
    Ok(())
}

fn content_length(lower_head: &str) -> Option<usize> {
    lower_head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
