use chrono::Utc;
use indexmap::IndexMap;
use std::io::Write;

/// Response status codes the gateway produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    UnprocessableEntity,
    InternalServerError,
    BadGateway,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::UnprocessableEntity => 422,
            Status::InternalServerError => 500,
            Status::BadGateway => 502,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::NoContent => "No Content",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::UnprocessableEntity => "Unprocessable Entity",
            Status::InternalServerError => "Internal Server Error",
            Status::BadGateway => "Bad Gateway",
        }
    }
}

/// An HTTP response under construction.
///
/// Handlers build the response through the request context; the server
/// writes it to the wire once the handler returns. `Date`,
/// `Content-Length`, and `Connection: close` headers are supplied at write
/// time.
pub struct Response {
    status: Status,
    headers: IndexMap<String, String>,
    cookies: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Response {
        Response {
            status: Status::Ok,
            headers: IndexMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Sets a response header. Header names are stored lowercased.
    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.insert(key.to_lowercase(), value.to_string());
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn add_cookie(&mut self, key: &str, value: &str) {
        self.cookies.push((key.to_string(), value.to_string()));
    }

    pub fn append_body(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn replace_body(&mut self, bytes: &[u8]) {
        self.body.clear();
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Writes the response to the wire in HTTP/1.1 form.
    pub fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}\r\n",
            self.status.code(),
            self.status.reason()
        )?;
        write!(
            writer,
            "date: {}\r\n",
            Utc::now().format("%a, %d %b %Y %H:%M:%S GMT")
        )?;
        write!(writer, "content-length: {}\r\n", self.body.len())?;
        write!(writer, "connection: close\r\n")?;
        for (key, value) in &self.headers {
            write!(writer, "{}: {}\r\n", key, value)?;
        }
        for (key, value) in &self.cookies {
            write!(writer, "set-cookie: {}={}\r\n", key, value)?;
        }
        write!(writer, "\r\n")?;
        writer.write_all(&self.body)?;
        Ok(())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response_is_empty_ok() {
        let response = Response::new();
        assert_eq!(response.status(), Status::Ok);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_append_body_accumulates() {
        let mut response = Response::new();
        response.append_body(b"hello ");
        response.append_body(b"world");
        assert_eq!(response.body(), b"hello world");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut response = Response::new();
        response.set_header("Content-Type", "application/json");
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_write_to_produces_http11_wire_form() {
        let mut response = Response::new();
        response.set_status(Status::Created);
        response.set_header("content-type", "text/plain");
        response.add_cookie("session", "abc");
        response.append_body(b"created");

        let mut wire = Vec::new();
        response.write_to(&mut wire).unwrap();
        let text = String::from_utf8(wire).unwrap();

        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.contains("content-length: 7\r\n"));
        assert!(text.contains("content-type: text/plain\r\n"));
        assert!(text.contains("set-cookie: session=abc\r\n"));
        assert!(text.contains("connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\ncreated"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Ok.code(), 200);
        assert_eq!(Status::NotFound.code(), 404);
        assert_eq!(Status::BadGateway.code(), 502);
    }
}
