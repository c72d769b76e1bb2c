//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                  - Liveness check
//! GET    /health/ready                            - Readiness check (pings storage)
//!
//! # Clientes
//! GET    /clientes                                - List clientes with enderecos
//! POST   /clientes                                - Create cliente
//! GET    /clientes/{id}                           - Cliente detail
//! PUT    /clientes/{id}                           - Replace cliente fields
//! DELETE /clientes/{id}                           - Delete cliente and its enderecos
//!
//! # Enderecos (scoped to their cliente)
//! GET    /clientes/{id}/enderecos                 - List a cliente's enderecos
//! POST   /clientes/{id}/enderecos                 - Add endereco to cliente
//! GET    /clientes/{id}/enderecos/{id_endereco}   - Endereco detail
//! DELETE /clientes/{id}/enderecos/{id_endereco}   - Remove endereco
//! ```

pub mod clientes;
pub mod enderecos;
pub mod health;

use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the clientes router, including the nested enderecos routes.
pub fn clientes_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(clientes::list).post(clientes::create))
        .route(
            "/{id}",
            get(clientes::show)
                .put(clientes::update)
                .delete(clientes::delete),
        )
        .route(
            "/{id}/enderecos",
            get(enderecos::list).post(enderecos::create),
        )
        .route(
            "/{id}/enderecos/{id_endereco}",
            get(enderecos::show).delete(enderecos::delete),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/clientes", clientes_routes())
}

/// Build the complete application: routes, state and middleware.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
