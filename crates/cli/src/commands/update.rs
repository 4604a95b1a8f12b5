//! Replay a profile update against Shopify.
//!
//! Uses the relay's own configuration and update path, so the result is
//! what the storefront would have received. The proxy-host filter does not
//! apply here.
//!
//! # Environment Variables
//!
//! - `SHOPIFY_SHOP` - Shopify store domain
//! - `SHOPIFY_ADMIN_TOKEN` - Admin API access token

use mycopet_core::{RawField, UpdateRequest};
use mycopet_relay::config::{ConfigError, RelayConfig};
use mycopet_relay::services::profile::handle_update;
use mycopet_relay::shopify::{AdminClient, ShopifyError};
use thiserror::Error;

/// Errors that can occur while replaying an update.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A `--field` argument was not `key=value`.
    #[error("Invalid field {0:?}: expected key=value")]
    InvalidField(String),

    /// Relay configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Shopify client could not be built.
    #[error("Shopify client error: {0}")]
    Client(#[from] ShopifyError),

    /// The outcome could not be rendered.
    #[error("Failed to render outcome: {0}")]
    Render(#[from] serde_json::Error),

    /// The relay reported `ok: false`.
    #[error("Update did not succeed")]
    NotOk,
}

/// Run one update and print the outcome JSON.
///
/// # Errors
///
/// Returns an error for malformed arguments, missing configuration, or an
/// outcome with `ok: false` (after printing it).
pub async fn run(email: &str, fields: &[String], namespace: Option<&str>) -> Result<(), UpdateError> {
    let request = UpdateRequest {
        email: Some(email.to_owned()),
        metafields: Some(parse_fields(fields, namespace)?),
    };

    let config = RelayConfig::from_env()?;
    for warning in config.warnings() {
        tracing::warn!("Configuration warning: {warning}");
    }
    let client = AdminClient::new(&config.shopify)?;

    tracing::info!(endpoint = %client.endpoint(), "Replaying profile update");
    let outcome = handle_update(&client, &request, true).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    if outcome.is_ok() {
        Ok(())
    } else {
        Err(UpdateError::NotOk)
    }
}

/// Parse `key=value` arguments into raw fields.
///
/// Values are kept as strings, exactly like a form submission.
fn parse_fields(fields: &[String], namespace: Option<&str>) -> Result<Vec<RawField>, UpdateError> {
    fields
        .iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| UpdateError::InvalidField(arg.clone()))?;

            let field = RawField::new(key.trim(), value);
            Ok(match namespace {
                Some(ns) => field.with_namespace(ns),
                None => field,
            })
        })
        .collect()
}
