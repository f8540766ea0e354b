use indexmap::IndexMap;
use std::io::{BufRead, Read};

use crate::errors::{ErrorKind, GatewayError, GatewayResult};

/// One parsed inbound HTTP/1.1 request.
///
/// Holds the method, the target split into path and query string, the
/// headers (names lowercased), and the body. The gateway reads one request
/// per connection and answers with `Connection: close`.
pub struct RawRequest {
    method: String,
    path: String,
    query: String,
    headers: IndexMap<String, String>,
    body: Vec<u8>,
}

impl RawRequest {
    /// Builds a request directly, primarily for driving the router without
    /// a socket.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `target` - The request target, e.g. `/api/data/db/c?status=active`
    pub fn build(method: &str, target: &str) -> RawRequest {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (target.to_string(), String::new()),
        };
        RawRequest {
            method: method.to_string(),
            path,
            query,
            headers: IndexMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> RawRequest {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> RawRequest {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    /// Parses one request from the wire.
    ///
    /// Reads the request line, the headers, and a `Content-Length` body.
    /// Anything malformed is a decode failure; the server answers it with
    /// a 400 without dispatching.
    pub fn parse(reader: &mut impl BufRead) -> GatewayResult<RawRequest> {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line)? == 0 {
            return Err(GatewayError::new(
                "Connection closed before a request line",
                ErrorKind::DecodeFailure,
            ));
        }

        let mut parts = request_line.split_whitespace();
        let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(target), Some(version)) => (method, target, version),
            _ => {
                return Err(GatewayError::new(
                    &format!("Malformed request line: {}", request_line.trim_end()),
                    ErrorKind::DecodeFailure,
                ))
            }
        };
        if !version.starts_with("HTTP/") {
            return Err(GatewayError::new(
                &format!("Unsupported protocol version: {}", version),
                ErrorKind::DecodeFailure,
            ));
        }

        let mut request = RawRequest::build(method, target);

        loop {
            let mut header_line = String::new();
            if reader.read_line(&mut header_line)? == 0 {
                return Err(GatewayError::new(
                    "Connection closed inside headers",
                    ErrorKind::DecodeFailure,
                ));
            }
            let header_line = header_line.trim_end();
            if header_line.is_empty() {
                break;
            }
            match header_line.split_once(':') {
                Some((key, value)) => {
                    request
                        .headers
                        .insert(key.trim().to_lowercase(), value.trim().to_string());
                }
                None => {
                    return Err(GatewayError::new(
                        &format!("Malformed header line: {}", header_line),
                        ErrorKind::DecodeFailure,
                    ))
                }
            }
        }

        if let Some(length) = request.headers.get("content-length") {
            let length: usize = length.parse().map_err(|_| {
                GatewayError::new(
                    &format!("Invalid content-length: {}", length),
                    ErrorKind::DecodeFailure,
                )
            })?;
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body)?;
            request.body = body;
        }

        Ok(request)
    }

    /// The HTTP method. For client requests an empty method never occurs;
    /// the parser rejects it.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw request path, before router normalization.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// A header value by case-insensitive name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(String::as_str)
    }

    /// A cookie value from the `Cookie` header, if present.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let cookies = self.header("cookie")?;
        for pair in cookies.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value);
                }
            }
        }
        None
    }
}
