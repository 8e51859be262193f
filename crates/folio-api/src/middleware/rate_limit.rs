use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use folio_core::{AppError, RateLimitSettings};
use folio_infra::{HttpRateLimiter, PolicyParseError, RateLimitPolicy};

use crate::error::HttpAppError;
use crate::middleware::client_ip::ClientIp;
use crate::utils::extract_client_ip;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Parsed policies for the three form endpoints.
#[derive(Debug, Clone)]
pub struct RateLimitPolicies {
    pub contact: Arc<RateLimitPolicy>,
    pub subscribe: Arc<RateLimitPolicy>,
    pub resume: Arc<RateLimitPolicy>,
}

impl RateLimitPolicies {
    pub fn from_settings(settings: &RateLimitSettings) -> Result<Self, PolicyParseError> {
        Ok(Self {
            contact: Arc::new(RateLimitPolicy::parse("contact", &settings.contact)?),
            subscribe: Arc::new(RateLimitPolicy::parse("subscribe", &settings.subscribe)?),
            resume: Arc::new(RateLimitPolicy::parse("resume", &settings.resume)?),
        })
    }
}

/// Middleware state for one rate-limited route.
#[derive(Clone)]
pub struct RouteRateLimit {
    limiter: Arc<HttpRateLimiter>,
    policy: Arc<RateLimitPolicy>,
    trusted_proxy_count: usize,
}

impl RouteRateLimit {
    pub fn new(
        limiter: Arc<HttpRateLimiter>,
        policy: Arc<RateLimitPolicy>,
        trusted_proxy_count: usize,
    ) -> Self {
        Self {
            limiter,
            policy,
            trusted_proxy_count,
        }
    }
}

fn set_header(response: &mut Response, name: HeaderName, value: impl ToString) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        response.headers_mut().insert(name, header_value);
    }
}

/// Per-IP rate limiting middleware
///
/// Applied with `route_layer` so each endpoint counts against its own policy. The
/// resolved client IP is stored as a `ClientIp` extension for the handler.
///
/// Adds `X-RateLimit-Limit` and `X-RateLimit-Remaining` to every response, plus
/// `Retry-After` on `429 Too Many Requests`. Rejected requests never reach the
/// handler, so their bodies are not read.
pub async fn rate_limit_middleware(
    State(route): State<RouteRateLimit>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        route.trusted_proxy_count,
    );

    match route.limiter.check(&route.policy, &ip).await {
        Ok(status) => {
            request.extensions_mut().insert(ClientIp(ip));
            let mut response = next.run(request).await;
            set_header(&mut response, LIMIT_HEADER, status.limit);
            set_header(&mut response, REMAINING_HEADER, status.remaining);
            response
        }
        Err(rejection) => {
            tracing::warn!(
                client_ip = %ip,
                policy = route.policy.name(),
                path = %request.uri().path(),
                limit = rejection.limit,
                "Rate limit exceeded"
            );

            let mut response =
                HttpAppError(AppError::RateLimited(route.policy.to_string())).into_response();
            set_header(&mut response, LIMIT_HEADER, rejection.limit);
            set_header(&mut response, REMAINING_HEADER, 0);
            set_header(
                &mut response,
                axum::http::header::RETRY_AFTER,
                rejection.retry_after_secs(),
            );
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies_parse() {
        let settings = folio_core::Config::default().rate_limits;
        let policies = RateLimitPolicies::from_settings(&settings).unwrap();
        assert_eq!(policies.contact.name(), "contact");
        assert_eq!(policies.contact.to_string(), "10 per hour; 1 per minute");
        assert_eq!(policies.resume.windows().len(), 2);
    }

    #[test]
    fn test_invalid_policy_is_reported() {
        let settings = RateLimitSettings {
            contact: "lots".to_string(),
            subscribe: "20 per hour".to_string(),
            resume: "5 per hour".to_string(),
        };
        assert!(RateLimitPolicies::from_settings(&settings).is_err());
    }
}
