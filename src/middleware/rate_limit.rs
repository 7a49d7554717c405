use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Per-IP rate limiting for the whole API
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Token bucket per client IP: one token every `rate_limit_per_second`
/// seconds, holding at most `rate_limit_burst` tokens.
///
/// Needs the peer address, so the app must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_global_governor(config: &Config) -> AppResult<GlobalGovernorLayer> {
    let governor_config = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second.max(1))
        .burst_size(config.rate_limit_burst.max(1))
        .finish()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid rate limit: {} per second, burst {}",
                config.rate_limit_per_second, config.rate_limit_burst
            ))
        })?;

    Ok(GovernorLayer::new(Arc::new(governor_config)))
}

/// Logs each request with the client address and flags rejected ones
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(client_ip = %addr.ip(), method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_server_error() {
        tracing::error!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}
