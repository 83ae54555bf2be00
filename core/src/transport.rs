//! The injected capability that turns an `HttpRequest` into an `HttpResponse`.
//!
//! # Design
//! The client never performs I/O itself. Anything implementing `Transport`
//! can be plugged in: the bundled `UreqTransport`, a caller's own HTTP stack,
//! or a scripted double in tests. A transport reports a response for every
//! status code; only failures to obtain a status at all are errors.
//! Connection pooling, retries and TLS are the transport's business.

use std::sync::Arc;

use crate::context::Context;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    /// Execute `request`, giving up once `ctx` is cancelled or past its
    /// deadline where the underlying stack allows it.
    fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(ctx, request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(ctx, request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(ctx, request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::time::Duration;

    use super::Transport;
    use crate::context::Context;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};

    /// Blocking transport backed by one pooled `ureq::Agent`.
    ///
    /// Status codes are returned as data (`http_status_as_error(false)`), so
    /// 4xx/5xx reach the client for classification. The configured timeout
    /// applies to the agent; a context deadline tighter than it is applied to
    /// the individual request.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        timeout: Option<Duration>,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::build(None)
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_timeout(timeout: Duration) -> Self {
            Self::build(Some(timeout))
        }

        fn build(timeout: Option<Duration>) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent, timeout }
        }

        /// Per-request override, only when the context deadline is tighter
        /// than the agent's own timeout.
        fn request_timeout(&self, ctx: &Context) -> Option<Duration> {
            let remaining = ctx.remaining()?;
            match self.timeout {
                Some(configured) if configured <= remaining => None,
                _ => Some(remaining),
            }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            ctx.check()?;

            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let mut builder = match method {
                HttpMethod::Put => self.agent.put(&url),
            };
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(timeout) = self.request_timeout(ctx) {
                builder = builder.config().timeout_global(Some(timeout)).build();
            }

            let result = match body {
                Some(bytes) => builder.send(&bytes[..]),
                None => builder.send_empty(),
            };
            let response = result.map_err(|err| match err {
                ureq::Error::Timeout(_) => TransportError::DeadlineExceeded,
                ureq::Error::Io(io) => TransportError::Io(io),
                other => TransportError::other(other),
            })?;

            let status = response.status().as_u16();
            let body = ResponseBody::new(response.into_body().into_reader());
            Ok(HttpResponse::new(status, body))
        }
    }

}
