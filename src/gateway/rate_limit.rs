//! Per-route admission control on top of [`RateLimiter`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::warn;

use super::error::GatewayError;
use crate::ratelimit::RateLimiter;

pub const RATE_LIMIT_LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING_HEADER: HeaderName =
    HeaderName::from_static("x-ratelimit-remaining");
pub const RATE_LIMIT_RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Limiter plus the per-minute budget of one route.
#[derive(Clone)]
pub struct RouteLimit {
    limiter: Arc<RateLimiter>,
    limit: u32,
}

impl RouteLimit {
    pub fn new(limiter: Arc<RateLimiter>, limit: u32) -> Self {
        Self { limiter, limit }
    }
}

/// Client key: first `X-Forwarded-For` entry, else the peer address.
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn enforce_rate_limit(
    State(route): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if !route.limiter.is_allowed(&key, route.limit) {
        warn!(client = %key, limit = route.limit, path = %request.uri().path(), "Rate limit exceeded");
        let mut response = GatewayError::RateLimited { limit: route.limit }.into_response();
        insert_rate_headers(response.headers_mut(), &route, 0);
        return response;
    }

    let mut response = next.run(request).await;
    let remaining = route.limiter.get_remaining(&key, route.limit);
    insert_rate_headers(response.headers_mut(), &route, remaining);
    response
}

fn insert_rate_headers(headers: &mut HeaderMap, route: &RouteLimit, remaining: u32) {
    let reset = Utc::now().timestamp() + route.limiter.window().as_secs() as i64;

    headers.insert(RATE_LIMIT_LIMIT_HEADER, HeaderValue::from(route.limit));
    headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
    headers.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from(reset));
}
