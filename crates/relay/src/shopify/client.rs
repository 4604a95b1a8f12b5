//! Shopify Admin API GraphQL client with static token authentication.

use std::sync::Arc;

use graphql_client::QueryBody;
use mycopet_core::{CustomerId, TypedField};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{ShopifyError, queries};
use crate::config::ShopifyConfig;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; all clones share one connection pool. Holds no state
/// between calls beyond the endpoint and token.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: Url,
    access_token: SecretString,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built or the HTTP
    /// client fails to initialise.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client: builder.build()?,
                endpoint: config.graphql_endpoint()?,
                access_token: config.access_token.clone(),
            }),
        })
    }

    /// Get the GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL document and return the parsed response body.
    ///
    /// The HTTP status is logged but not acted on: Shopify reports most
    /// failures inside the JSON body, and the body is what callers want.
    async fn execute<V: Serialize + Sync>(
        &self,
        body: &QueryBody<V>,
    ) -> Result<Value, ShopifyError> {
        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                operation = body.operation_name,
                "Shopify returned non-success status"
            );
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    // =========================================================================
    // Customer methods
    // =========================================================================

    /// Find the first customer whose email matches.
    ///
    /// Returns `Ok(None)` when the search has no hits, and also when the
    /// response carries no usable data (GraphQL errors are logged).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    #[instrument(skip(self))]
    pub async fn find_customer_id(&self, email: &str) -> Result<Option<CustomerId>, ShopifyError> {
        let response = self
            .execute(&queries::find_customer_by_email(email))
            .await?;

        if let Some(errors) = response.get("errors") {
            tracing::warn!(errors = %errors, "Customer lookup returned GraphQL errors");
        }

        Ok(customer_id_from_lookup(&response))
    }

    /// Write metafields on a customer.
    ///
    /// The raw response is returned as-is, including any `userErrors`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    #[instrument(
        skip(self, owner, fields),
        fields(customer_id = owner.numeric_id().unwrap_or(owner.as_str()), field_count = fields.len())
    )]
    pub async fn set_metafields(
        &self,
        owner: &CustomerId,
        fields: &[TypedField],
    ) -> Result<Value, ShopifyError> {
        self.execute(&queries::set_customer_metafields(owner, fields))
            .await
    }
}

/// Extract `data.customers.edges[0].node.id` from a lookup response.
#[must_use]
pub fn customer_id_from_lookup(response: &Value) -> Option<CustomerId> {
    response
        .pointer("/data/customers/edges/0/node/id")
        .and_then(Value::as_str)
        .and_then(|id| CustomerId::parse(id).ok())
}
