//! The transport boundary: a single-attempt, asynchronous request seam.
//!
//! The orchestrator is the only component that calls the transport. Tests
//! substitute a scripted implementation; production uses `HttpTransport`.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::GridResult;

pub mod http;

pub use http::HttpTransport;

/// HTTP method subset the service API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Status code and parsed JSON body (if any) of one remote response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<JsonValue>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Asynchronous request channel to the remote service. Implementations
/// perform exactly one attempt per call: no retries, no backoff, no
/// internal timeout. Cancellation and timeouts are a caller concern at this
/// boundary.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<JsonValue>,
    ) -> GridResult<TransportResponse>;
}
