//! Blocking client for the MockServer administrative API.
//!
//! # Overview
//! Registers expectations (`PUT /mockserver/expectation`), verifies that they
//! were matched (`PUT /mockserver/verify`) and clears server state
//! (`PUT /mockserver/clear`). Status codes are translated into a typed
//! `ApiError`; transport failures stay distinguishable from the server's
//! explicit rejections.
//!
//! # Design
//! - `MockServerClient` holds only a base URL and an injected `Transport`.
//! - Each operation is split into `build_*` (produces request) and
//!   `classify_*` (consumes status), so the I/O boundary is explicit.
//! - Every call takes a `Context` for cancellation and deadlines.
//! - Nothing is retried; every failure is returned to the caller.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{MockServerClient, CLEAR_ENDPOINT, EXPECTATION_ENDPOINT, VERIFY_ENDPOINT};
pub use config::{ClientConfig, ConfigError};
pub use context::Context;
pub use error::{ApiError, Operation, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{ExpectationId, VerificationTimes, VerifyRequestBody};
