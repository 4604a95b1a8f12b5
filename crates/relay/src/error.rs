//! Unified error handling for the relay.
//!
//! These errors never become HTTP error statuses. The update handler folds
//! them into a `{ok:false, error}` body with status 200; see
//! [`crate::services::profile::UpdateOutcome`].

use mycopet_core::TransformError;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Failure while processing a profile update.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Shopify API call failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// A submitted field could not be coerced.
    #[error("Invalid field: {0}")]
    Transform(#[from] TransformError),
}

impl RelayError {
    /// Report the error to Sentry and the log, returning its message.
    pub fn report(&self) -> String {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Profile update failed"
        );
        self.to_string()
    }
}
