//! Application state shared by every handler.

use std::sync::Arc;

use folio_core::Config;
use folio_db::StoreHandle;
use folio_infra::{HttpRateLimiter, PolicyParseError};

use crate::middleware::{RateLimitPolicies, RouteRateLimit};
use crate::services::email::Notifier;

/// Explicitly injected handles: configuration, storage, mailer and limiter.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: StoreHandle,
    pub notifier: Arc<dyn Notifier>,
    pub rate_limiter: Arc<HttpRateLimiter>,
    pub policies: RateLimitPolicies,
}

impl AppState {
    pub fn new(
        config: Config,
        store: StoreHandle,
        notifier: Arc<dyn Notifier>,
        rate_limiter: Arc<HttpRateLimiter>,
    ) -> Result<Self, PolicyParseError> {
        let policies = RateLimitPolicies::from_settings(&config.rate_limits)?;
        Ok(Self {
            config,
            store,
            notifier,
            rate_limiter,
            policies,
        })
    }

    pub fn contact_limit(&self) -> RouteRateLimit {
        self.route_limit(&self.policies.contact)
    }

    pub fn subscribe_limit(&self) -> RouteRateLimit {
        self.route_limit(&self.policies.subscribe)
    }

    pub fn resume_limit(&self) -> RouteRateLimit {
        self.route_limit(&self.policies.resume)
    }

    fn route_limit(&self, policy: &Arc<folio_infra::RateLimitPolicy>) -> RouteRateLimit {
        RouteRateLimit::new(
            self.rate_limiter.clone(),
            policy.clone(),
            self.config.trusted_proxy_count,
        )
    }
}
