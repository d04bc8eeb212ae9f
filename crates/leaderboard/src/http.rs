//! Minimal HTTP/1.1 framing: one request and one response per connection.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::HttpError;

/// Upper bound on the request line plus headers
const MAX_HEAD_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Decoded path without the query string
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value for `name` in the query string
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                log::error!("failed to encode response body: {e}");
                Self {
                    status: 500,
                    body: br#"{"error":"Internal server error"}"#.to_vec(),
                }
            }
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Decode `%XX` escapes and `+` as space. Invalid escapes are kept verbatim.
pub fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                        continue;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

/// Read CRLF-terminated header lines until the blank line. Returns the
/// first line and the parsed headers.
async fn read_head<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<(String, Vec<(String, String)>), HttpError> {
    let mut first = String::new();
    let mut headers = Vec::new();
    let mut total = 0usize;
    let mut line = String::new();
    loop {
        line.clear();
        // At most one byte past the cap, so an endless line is cut off.
        let budget = (MAX_HEAD_BYTES - total + 1) as u64;
        let n = (&mut *reader).take(budget).read_line(&mut line).await?;
        if n == 0 {
            return Err(HttpError::Incomplete);
        }
        total += n;
        if total > MAX_HEAD_BYTES {
            return Err(HttpError::Malformed("header section too large"));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if first.is_empty() {
            if trimmed.is_empty() {
                // tolerate leading blank lines
                continue;
            }
            first = trimmed.to_string();
            continue;
        }
        if trimmed.is_empty() {
            return Ok((first, headers));
        }
        let (name, value) = trimmed
            .split_once(':')
            .ok_or(HttpError::Malformed("header without colon"))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }
}

fn content_length(headers: &[(String, String)]) -> Result<Option<usize>, HttpError> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| {
            v.parse::<usize>()
                .map_err(|_| HttpError::Malformed("invalid content-length"))
        })
        .transpose()
}

pub async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_body: usize,
) -> Result<Request, HttpError> {
    let (request_line, headers) = read_head(reader).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or(HttpError::Malformed("empty request line"))?;
    let target = parts.next().ok_or(HttpError::Malformed("missing request target"))?;
    let version = parts.next().ok_or(HttpError::Malformed("missing http version"))?;
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::Malformed("unsupported http version"));
    }

    let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));

    let len = content_length(&headers)?.unwrap_or(0);
    if len > max_body {
        return Err(HttpError::BodyTooLarge { limit: max_body });
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            HttpError::Incomplete
        } else {
            HttpError::Io(e)
        }
    })?;

    Ok(Request {
        method: method.to_ascii_uppercase(),
        path: percent_decode(raw_path),
        query: parse_query(raw_query),
        headers,
        body,
    })
}

/// Response headers shared by every answer from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cors {
    pub allow_origin: String,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
        }
    }
}

pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

pub fn encode_response(response: &Response, cors: &Cors, out: &mut Vec<u8>) {
    use std::fmt::Write as _;

    let mut head = String::with_capacity(256);
    let _ = write!(
        head,
        "HTTP/1.1 {} {}\r\n\
         Access-Control-Allow-Origin: {}\r\n\
         Access-Control-Allow-Methods: {}\r\n\
         Access-Control-Allow-Headers: {}\r\n",
        response.status,
        reason_phrase(response.status),
        cors.allow_origin,
        CORS_ALLOW_METHODS,
        CORS_ALLOW_HEADERS,
    );
    if !response.body.is_empty() {
        head.push_str("Content-Type: application/json\r\n");
    }
    let _ = write!(
        head,
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.body.len()
    );
    out.extend_from_slice(head.as_bytes());
    out.extend_from_slice(&response.body);
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    cors: &Cors,
) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(256 + response.body.len());
    encode_response(response, cors, &mut buf);
    writer.write_all(&buf).await?;
    writer.flush().await
}

/// Status and body of a response read by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ClientResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub async fn read_response<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<ClientResponse, HttpError> {
    let (status_line, headers) = read_head(reader).await?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or(HttpError::Malformed("invalid status line"))?;

    let body = match content_length(&headers)? {
        Some(len) => {
            let mut body = vec![0u8; len];
            reader.read_exact(&mut body).await?;
            body
        }
        None => {
            let mut body = Vec::new();
            reader.read_to_end(&mut body).await?;
            body
        }
    };
    Ok(ClientResponse {
        status,
        headers,
        body,
    })
}
