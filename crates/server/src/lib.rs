//! Caja POS backend.
//!
//! Serves the `/invoke/{command}` surface the point-of-sale client talks to:
//! session login, catalogue and staff management, transactional sales and
//! reports, all backed by `PostgreSQL`.
//!
//! # Architecture
//!
//! - `routes` - Axum handlers, one router per functional area
//! - `middleware` - Sessions, permission guards, login rate limit
//! - `services` - Login, account rules, sale transaction, report math
//! - `db` - Repositories over `sqlx::PgPool`
//!
//! The `caja-server` binary wires these together; `caja-cli` reuses the
//! services and repositories for migrations, seeding and user creation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::service::SignedCookie;
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

pub use config::ServerConfig;
pub use error::AppError;
pub use state::AppState;

/// Build the application router with sessions and request tracing.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    routes::routes()
        .layer(sessions)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
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
}
