use serde::Serialize;
use url::form_urlencoded;

use crate::common::Value;
use crate::errors::{GatewayError, GatewayResult};
use crate::filter::QueryParams;
use crate::http::{RawRequest, Response, Status};

/// Per-call façade over the transport request/response pair.
///
/// One `RequestContext` exists per inbound call. It carries the normalized
/// path, the ordered positional params extracted by the router, and the
/// response under construction; it is destroyed when the handler returns.
/// Handlers report their own failures through [write_error]; the
/// dispatcher applies no retry or recovery of its own.
///
/// [write_error]: RequestContext::write_error
pub struct RequestContext {
    request: RawRequest,
    path: String,
    params: Vec<String>,
    response: Response,
}

impl RequestContext {
    pub(crate) fn new(request: RawRequest, path: String, params: Vec<String>) -> RequestContext {
        RequestContext {
            request,
            path,
            params,
            response: Response::new(),
        }
    }

    /// The HTTP method of the request.
    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// The normalized request path: no leading separator, one trailing
    /// separator.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Positional params captured from the matched pattern. Empty when the
    /// pattern has no capture groups.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Decodes the query string into an ordered multimap: first-seen key
    /// order, values in arrival order. A bare `?key` yields an empty-string
    /// value.
    pub fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (key, value) in form_urlencoded::parse(self.request.query().as_bytes()) {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        params
    }

    /// The raw request body.
    pub fn body(&self) -> &[u8] {
        self.request.body()
    }

    /// The request body as text.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(self.request.body()).into_owned()
    }

    /// Decodes the request body as a JSON payload value.
    pub fn body_json(&self) -> GatewayResult<Value> {
        Ok(serde_json::from_slice(self.request.body())?)
    }

    /// Appends bytes to the response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.response.append_body(bytes);
    }

    /// Appends text to the response body.
    pub fn write_string(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    /// Serializes a value as JSON into the response and marks the content
    /// type. Serialization failure is reported through [write_error].
    ///
    /// [write_error]: RequestContext::write_error
    pub fn write_json<T: Serialize>(&mut self, value: &T) {
        match serde_json::to_vec(value) {
            Ok(json) => {
                self.response
                    .set_header("content-type", "application/json");
                self.write(&json);
            }
            Err(err) => {
                log::error!("Error serializing response JSON: {}", err);
                self.write_error(
                    "Error writing JSON: ",
                    &GatewayError::from(err),
                    Status::UnprocessableEntity,
                );
            }
        }
    }

    /// Sets the response status code.
    pub fn write_status(&mut self, status: Status) {
        self.response.set_status(status);
    }

    /// A request header value, if present. Lookup is case-insensitive.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.request.header(key)
    }

    /// Sets a response header.
    pub fn set_header(&mut self, key: &str, value: &str) {
        self.response.set_header(key, value);
    }

    /// A request cookie value, if present.
    pub fn cookie(&self, key: &str) -> Option<&str> {
        self.request.cookie(key)
    }

    /// Sets a response cookie.
    pub fn set_cookie(&mut self, key: &str, value: &str) {
        self.response.add_cookie(key, value);
    }

    /// Writes an error response: plain text `prefix + error`, with the
    /// given status. The response body is replaced, not appended to.
    pub fn write_error(&mut self, prefix: &str, err: &GatewayError, status: Status) {
        log::error!("Handler error: {}{}", prefix, err);
        self.response.set_status(status);
        self.response.set_header("content-type", "text/plain; charset=utf-8");
        self.response.replace_body(format!("{}{}\n", prefix, err).as_bytes());
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}
