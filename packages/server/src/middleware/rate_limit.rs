use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use common::RateLimitDecision;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Bucket a request is counted against, with its quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitKey {
    User(i32),
    Anonymous(String),
}

impl RateLimitKey {
    pub fn identifier(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Anonymous(ip) => format!("anon:{ip}"),
        }
    }
}

/// Enforce the fixed-window quota for the caller.
///
/// Requests with a bearer token that verifies are counted per user; everything
/// else is counted per client address. An invalid token is not rejected here,
/// the handler's extractor does that.
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set.
pub async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let config = &state.config.rate_limit;
    if !config.enabled {
        return Ok(next.run(request).await);
    }

    let key = rate_limit_key(&state, &request);
    let max = match key {
        RateLimitKey::User(_) => config.authenticated_max,
        RateLimitKey::Anonymous(_) => config.anonymous_max,
    };
    let identifier = key.identifier();

    match state.rate_limiter.check(&identifier, max, config.window()) {
        RateLimitDecision::Allowed { .. } => Ok(next.run(request).await),
        RateLimitDecision::Limited { retry_after } => {
            let retry_after = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            warn!(%identifier, retry_after, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after })
        }
    }
}

fn rate_limit_key(state: &AppState, request: &Request) -> RateLimitKey {
    let user_id = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| jwt::verify(token, &state.config.auth.jwt_secret).ok())
        .map(|claims| claims.uid);

    match user_id {
        Some(id) => RateLimitKey::User(id),
        None => {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            let ip = client_ip(
                request.headers(),
                peer,
                state.config.rate_limit.trust_proxy_headers,
            );
            RateLimitKey::Anonymous(ip.map_or_else(|| "unknown".to_string(), |ip| ip.to_string()))
        }
    }
}

/// Resolve the client address.
///
/// With `trust_proxy` the first `X-Forwarded-For` hop, then `X-Real-IP`, is
/// used if it parses as an IP address. Otherwise, or when neither header
/// holds an address, the socket peer is used.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> Option<IpAddr> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    trust_proxy
        .then(|| header("x-forwarded-for").or_else(|| header("x-real-ip")))
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip()))
}
