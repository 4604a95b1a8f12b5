//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Admin API access token.** The relay only ever
//! issues two documents with it:
//! - a customer search by email
//! - a `metafieldsSet` mutation on the resolved customer
//!
//! # Architecture
//!
//! - Request envelopes are `graphql_client::QueryBody` values
//! - Responses are returned as untyped JSON so upstream `userErrors` reach
//!   the caller untouched
//! - No status-code inspection, no retries
//!
//! # Example
//!
//! ```rust,ignore
//! use mycopet_relay::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify)?;
//!
//! if let Some(customer_id) = client.find_customer_id("owner@example.com").await? {
//!     let result = client.set_metafields(&customer_id, &fields).await?;
//! }
//! ```

mod client;
pub mod queries;

pub use client::{AdminClient, customer_id_from_lookup};

use thiserror::Error;

/// Errors that can occur when talking to the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL could not be turned into an endpoint.
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}
