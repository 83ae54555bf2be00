//! Client for the MockServer control-plane endpoints.
//!
//! # Design
//! `MockServerClient` holds only a `base_url` and the injected transport and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `classify_*` method
//! that maps the response status to `Ok(())` or an `ApiError`. The I/O
//! methods (`create_expectation`, `verify_request`, `clear`) glue the two
//! halves around a single transport exchange; callers that run their own
//! I/O can use the halves directly.

use std::io::{self, Read};

use tracing::debug;

use crate::context::Context;
use crate::error::{ApiError, Operation, TransportError};
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;
use crate::types::VerifyRequestBody;

pub const EXPECTATION_ENDPOINT: &str = "/mockserver/expectation";
pub const VERIFY_ENDPOINT: &str = "/mockserver/verify";
pub const CLEAR_ENDPOINT: &str = "/mockserver/clear";

/// Stateless client for the MockServer administrative API.
///
/// Safe to share between threads whenever `T` is.
#[derive(Debug, Clone)]
pub struct MockServerClient<T> {
    base_url: String,
    transport: T,
}

impl<T> MockServerClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// The expectation bytes are sent verbatim.
    pub fn build_create_expectation(&self, expectation: &[u8]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            url: self.url(EXPECTATION_ENDPOINT),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(expectation.to_vec()),
        }
    }

    pub fn build_verify_request(&self, body: &VerifyRequestBody) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(body).map_err(|source| ApiError::Serialization {
            operation: Operation::VerifyRequest,
            source,
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.url(VERIFY_ENDPOINT),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_clear(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            url: self.url(CLEAR_ENDPOINT),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn classify_create_expectation(&self, status: u16) -> Result<(), ApiError> {
        match status {
            201 => Ok(()),
            400 => Err(ApiError::IncorrectRequestFormat),
            406 => Err(ApiError::InvalidExpectation),
            status_code => Err(ApiError::UnexpectedStatusCode {
                endpoint: EXPECTATION_ENDPOINT,
                status_code,
            }),
        }
    }

    pub fn classify_verify_request(&self, status: u16) -> Result<(), ApiError> {
        match status {
            202 => Ok(()),
            400 => Err(ApiError::IncorrectRequestFormat),
            406 => Err(ApiError::RequestHasNotBeenReceived),
            status_code => Err(ApiError::UnexpectedStatusCode {
                endpoint: VERIFY_ENDPOINT,
                status_code,
            }),
        }
    }

    pub fn classify_clear(&self, status: u16) -> Result<(), ApiError> {
        if (200..300).contains(&status) {
            return Ok(());
        }
        Err(ApiError::UnexpectedStatusCode {
            endpoint: CLEAR_ENDPOINT,
            status_code: status,
        })
    }
}

impl<T: Transport> MockServerClient<T> {
    /// Register one expectation. Succeeds on `201 Created`.
    pub fn create_expectation(&self, ctx: &Context, expectation: &[u8]) -> Result<(), ApiError> {
        let request = self.build_create_expectation(expectation);
        let status = self.exchange(ctx, Operation::CreateExpectation, request)?;
        self.classify_create_expectation(status)
    }

    /// Verify an expectation was matched. Succeeds on `202 Accepted`.
    ///
    /// The body is marshalled before anything is sent; a marshalling failure
    /// never reaches the transport.
    pub fn verify_request(&self, ctx: &Context, body: &VerifyRequestBody) -> Result<(), ApiError> {
        let request = self.build_verify_request(body)?;
        let status = self.exchange(ctx, Operation::VerifyRequest, request)?;
        self.classify_verify_request(status)
    }

    /// Clear all expectations and recorded requests. Succeeds on any 2xx.
    pub fn clear(&self, ctx: &Context) -> Result<(), ApiError> {
        let request = self.build_clear();
        let status = self.exchange(ctx, Operation::Clear, request)?;
        self.classify_clear(status)
    }

    /// Run one exchange and return the final status once the body has been
    /// drained. The response is dropped before returning on every path.
    fn exchange(&self, ctx: &Context, operation: Operation, request: HttpRequest) -> Result<u16, ApiError> {
        let transport_err = |source: TransportError| ApiError::Transport { operation, source };

        ctx.check().map_err(transport_err)?;

        debug!(operation = %operation, method = %request.method, url = %request.url, "sending request");
        let mut response = self.transport.execute(ctx, request).map_err(transport_err)?;

        drain(ctx, &mut response.body).map_err(|err| match err {
            DrainError::Context(source) => transport_err(source),
            DrainError::Read(source) => ApiError::ReadBody { operation, source },
        })?;

        debug!(operation = %operation, status = response.status, "received response");
        Ok(response.status)
    }
}

enum DrainError {
    Context(TransportError),
    Read(io::Error),
}

/// Read `body` to EOF, checking `ctx` before every read. Once EOF is reached
/// the exchange is complete and a later cancellation no longer applies.
fn drain(ctx: &Context, body: &mut impl Read) -> Result<(), DrainError> {
    let mut buf = [0u8; 4096];
    loop {
        ctx.check().map_err(DrainError::Context)?;
        match body.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                // A read cut short by cancellation reports the cancellation.
                return Err(match ctx.check() {
                    Err(source) => DrainError::Context(source),
                    Ok(()) => DrainError::Read(err),
                });
            }
        }
    }
}

#[cfg(feature = "ureq")]
impl MockServerClient<crate::transport::UreqTransport> {
    /// Client over a `UreqTransport` built from `config`.
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        let transport = match config.timeout {
            Some(timeout) => crate::transport::UreqTransport::with_timeout(timeout),
            None => crate::transport::UreqTransport::new(),
        };
        Self::new(&config.base_url, transport)
    }
}
