//! Customer profile update: lookup by email, coerce, write metafields.
//!
//! Every path ends in an [`UpdateOutcome`]; nothing here returns an error
//! to the caller. The storefront calls this during checkout and must never
//! be blocked by a failure on our side.

use mycopet_core::{RawField, UpdateRequest, transform_fields};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::instrument;

use crate::error::RelayError;
use crate::shopify::AdminClient;

/// Why a request was accepted without writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No email, or no fields to write.
    MissingInput,
    /// The email matched no Shopify customer.
    CustomerNotFound,
}

impl SkipReason {
    /// Wire string reported in the `skipped` member.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingInput => "missing email or metafields",
            Self::CustomerNotFound => "customer-not-found",
        }
    }
}

/// Why a request was refused before any upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The forwarded host did not contain the configured proxy host.
    NotFromProxy,
}

impl RejectReason {
    /// Wire string reported in the `reason` member.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFromProxy => "not-from-shopify-proxy",
        }
    }
}

/// Result of handling one update request.
///
/// Serialises to the response body:
///
/// | Variant | Body |
/// |---------|------|
/// | `Skipped` | `{"ok":true,"skipped":"..."}` |
/// | `Rejected` | `{"ok":false,"reason":"..."}` |
/// | `Updated` | `{"ok":true,"result":<upstream JSON>}` |
/// | `Failed` | `{"ok":false,"error":"..."}` |
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Skipped(SkipReason),
    Rejected(RejectReason),
    Updated(Value),
    Failed(String),
}

impl UpdateOutcome {
    /// The `ok` flag of the response body.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Skipped(_) | Self::Updated(_))
    }
}

impl Serialize for UpdateOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("ok", &self.is_ok())?;
        match self {
            Self::Skipped(reason) => map.serialize_entry("skipped", reason.as_str())?,
            Self::Rejected(reason) => map.serialize_entry("reason", reason.as_str())?,
            Self::Updated(result) => map.serialize_entry("result", result)?,
            Self::Failed(error) => map.serialize_entry("error", error)?,
        }
        map.end()
    }
}

/// Convenience filter on the host a request arrived through.
///
/// Matches when `host` contains `allowed`, ignoring case. This is a string
/// heuristic on a client-controlled header. It does NOT authenticate the
/// caller; anyone can send a matching `X-Forwarded-Host`.
#[must_use]
pub fn host_matches(host: Option<&str>, allowed: &str) -> bool {
    host.is_some_and(|host| {
        host.to_ascii_lowercase()
            .contains(&allowed.to_ascii_lowercase())
    })
}

/// Handle a parsed update request end to end.
///
/// `from_proxy` is the result of the host filter; pass `true` when the
/// filter is disabled.
pub async fn handle_update(
    client: &AdminClient,
    request: &UpdateRequest,
    from_proxy: bool,
) -> UpdateOutcome {
    let Some(email) = request.email().filter(|_| !request.fields().is_empty()) else {
        tracing::debug!("Update skipped: missing email or metafields");
        return UpdateOutcome::Skipped(SkipReason::MissingInput);
    };

    if !from_proxy {
        tracing::warn!("Update rejected: request did not arrive through the app proxy");
        return UpdateOutcome::Rejected(RejectReason::NotFromProxy);
    }

    apply_update(client, email, request.fields()).await
}

/// Resolve the customer and write the fields, folding failures into
/// [`UpdateOutcome::Failed`].
#[instrument(skip(client, fields), fields(field_count = fields.len()))]
pub async fn apply_update(client: &AdminClient, email: &str, fields: &[RawField]) -> UpdateOutcome {
    match try_apply_update(client, email, fields).await {
        Ok(outcome) => outcome,
        Err(err) => UpdateOutcome::Failed(err.report()),
    }
}

async fn try_apply_update(
    client: &AdminClient,
    email: &str,
    fields: &[RawField],
) -> Result<UpdateOutcome, RelayError> {
    let Some(customer_id) = client.find_customer_id(email).await? else {
        tracing::info!("No customer matches email");
        return Ok(UpdateOutcome::Skipped(SkipReason::CustomerNotFound));
    };

    let typed = transform_fields(fields)?;
    let result = client.set_metafields(&customer_id, &typed).await?;

    tracing::info!(
        customer_id = %customer_id,
        field_count = typed.len(),
        "Customer metafields written"
    );

    Ok(UpdateOutcome::Updated(result))
}
