//! Inbound customer profile update payload.
//!
//! The storefront posts whatever its form produced, so deserialisation is
//! lenient: a field of the wrong JSON shape is treated as absent and the
//! request ends up skipped instead of rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::metafield::RawField;

/// Body of `POST /mycopet-customer-update`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Customer email used for the lookup.
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    /// Profile fields to write, in submission order.
    #[serde(default, deserialize_with = "lenient_fields")]
    pub metafields: Option<Vec<RawField>>,
}

impl UpdateRequest {
    /// Build a request from an arbitrary JSON body.
    ///
    /// Bodies that are not objects (arrays, `null`, scalars) yield an empty
    /// request.
    #[must_use]
    pub fn from_json(body: Value) -> Self {
        serde_json::from_value(body).unwrap_or_default()
    }

    /// Returns the trimmed email, or `None` if it is absent or blank.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    /// Returns the submitted fields, empty if none were sent.
    #[must_use]
    pub fn fields(&self) -> &[RawField] {
        self.metafields.as_deref().unwrap_or_default()
    }

    /// True when there is an email and at least one field to write.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.email().is_some() && !self.fields().is_empty()
    }
}

/// Accept a JSON string, treat any other shape as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Accept an array of fields, treat any other shape as absent.
///
/// Every element yields exactly one field, see [`RawField::from_json`].
fn lenient_fields<'de, D>(deserializer: D) -> Result<Option<Vec<RawField>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    Ok(Some(items.into_iter().map(RawField::from_json).collect()))
}
