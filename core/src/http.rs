//! HTTP exchange types passed between the client and its transport.
//!
//! # Design
//! Requests are plain data: the client builds an `HttpRequest` and hands it to
//! a `Transport`, which performs the actual I/O. Responses keep their body as a
//! reader so the client decides when the body is drained; a body that fails
//! mid-read is reported as a read failure rather than a transport failure.

use std::fmt;
use std::io::{self, Read};

/// HTTP method for a request. Every control-plane endpoint takes PUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `MockServerClient::build_*` methods. `url` is absolute: the
/// client's base URL joined with the control-plane path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Readable response body handed back by a transport.
pub struct ResponseBody(Box<dyn Read>);

impl ResponseBody {
    pub fn new(reader: impl Read + 'static) -> Self {
        Self(Box::new(reader))
    }

    pub fn empty() -> Self {
        Self::new(io::empty())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(io::Cursor::new(bytes.into()))
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody(..)")
    }
}

/// An HTTP response as returned by a `Transport`.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_reads_its_bytes() {
        let mut body = ResponseBody::from_bytes("some_response_body");
        let mut text = String::new();
        body.read_to_string(&mut text).unwrap();
        assert_eq!(text, "some_response_body");

        let mut rest = Vec::new();
        assert_eq!(ResponseBody::empty().read_to_end(&mut rest).unwrap(), 0);
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }
}
