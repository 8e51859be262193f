//! Outbound email setup

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_core::Config;

use crate::services::email::{DisabledNotifier, Notifier, SmtpNotifier};

/// SMTP notifier when credentials are configured, otherwise a notifier that
/// reports every send as not configured.
pub fn setup_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    match SmtpNotifier::from_settings(&config.smtp).context("Failed to initialize SMTP transport")? {
        Some(notifier) => Ok(Arc::new(notifier)),
        None => {
            tracing::warn!(
                "SMTP_USER/SMTP_PASSWORD not set - contact notifications and resume emails are disabled"
            );
            Ok(Arc::new(DisabledNotifier))
        }
    }
}
