//! Configuration validation
//!
//! Startup checks that need more than `Config::validate`, such as parsing the
//! rate limit policies.

use anyhow::{Context, Result};
use folio_core::Config;

use crate::middleware::RateLimitPolicies;

/// Validate configuration, failing on anything that would misbehave at runtime.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let policies = RateLimitPolicies::from_settings(&config.rate_limits)
        .context("Invalid RATE_LIMIT_* policy")?;
    tracing::info!(
        contact = %policies.contact,
        subscribe = %policies.subscribe,
        resume = %policies.resume,
        "Rate limit policies"
    );

    if config.trusted_proxy_count > 10 {
        tracing::warn!(
            trusted_proxy_count = config.trusted_proxy_count,
            "TRUSTED_PROXY_COUNT is very high - ensure this matches your actual proxy setup"
        );
    }
    if !config.smtp.has_credentials() {
        tracing::warn!("SMTP credentials missing - resume requests will be logged as failed");
    }
    if config.contact_recipient.is_none() {
        tracing::info!("CONTACT_RECIPIENT not set - contact messages are stored without notification");
    }

    if !std::path::Path::new(&config.resume.path).is_file() {
        tracing::warn!(path = %config.resume.path, "Resume attachment not found");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_bad_policy_fails_validation() {
        let mut config = Config::default();
        config.rate_limits.resume = "5 per fortnight".to_string();
        assert!(validate_config(&config).is_err());
    }
}
