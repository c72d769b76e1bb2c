//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (`http_request` span with method, uri, status, latency)
//! 3. Request ID (recorded into the `http_request` span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
