//! Metafield types for customer profile updates.

use serde::{Deserialize, Serialize};

use crate::transform::value_to_string;

/// Namespace applied to fields that arrive without one.
pub const DEFAULT_NAMESPACE: &str = "profile";

/// Keys written as Shopify `date` metafields.
pub const DATE_KEYS: &[&str] = &["pet_date_of_birth"];

/// Keys written as Shopify `number_decimal` metafields.
pub const DECIMAL_KEYS: &[&str] = &["pet_weight_kg", "pet_age_years"];

/// Shopify metafield type tag.
///
/// Only the three types the profile form produces are modelled. The tag is
/// picked from the key alone, see [`MetafieldType::for_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetafieldType {
    /// ISO calendar date (`YYYY-MM-DD`).
    Date,
    /// Decimal number serialised as a string.
    NumberDecimal,
    /// Free text on a single line.
    #[default]
    SingleLineTextField,
}

impl MetafieldType {
    /// Choose the metafield type for a key.
    ///
    /// Membership in [`DATE_KEYS`] wins over [`DECIMAL_KEYS`]; every other
    /// key is text. The value is never inspected.
    #[must_use]
    pub fn for_key(key: &str) -> Self {
        if DATE_KEYS.contains(&key) {
            Self::Date
        } else if DECIMAL_KEYS.contains(&key) {
            Self::NumberDecimal
        } else {
            Self::SingleLineTextField
        }
    }

    /// Returns the Shopify wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::NumberDecimal => "number_decimal",
            Self::SingleLineTextField => "single_line_text_field",
        }
    }
}

impl std::fmt::Display for MetafieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetafieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "number_decimal" => Ok(Self::NumberDecimal),
            "single_line_text_field" => Ok(Self::SingleLineTextField),
            _ => Err(format!("unsupported metafield type: {s}")),
        }
    }
}

/// A profile field as submitted by the storefront form.
///
/// `value` is kept as arbitrary JSON; coercion happens in
/// [`crate::transform`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawField {
    /// Metafield namespace; [`DEFAULT_NAMESPACE`] when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Metafield key.
    #[serde(default)]
    pub key: String,
    /// Submitted value, any JSON.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl RawField {
    /// Create a field in the default namespace.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            namespace: None,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Set an explicit namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Build a field from one submitted list entry, whatever its shape.
    ///
    /// Non-string `key` and `namespace` members are stringified, a `null`
    /// namespace counts as absent, and an entry that is not an object becomes
    /// a field with an empty key and a `null` value.
    #[must_use]
    pub fn from_json(entry: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut members) = entry else {
            return Self::default();
        };

        let namespace = members
            .remove("namespace")
            .filter(|ns| !ns.is_null())
            .map(|ns| value_to_string(&ns));
        let key = members
            .remove("key")
            .map(|key| value_to_string(&key))
            .unwrap_or_default();
        let value = members.remove("value").unwrap_or_default();

        Self {
            namespace,
            key,
            value,
        }
    }

    /// Returns the effective namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => DEFAULT_NAMESPACE,
        }
    }
}

/// A coerced field, shaped as Shopify's `MetafieldsSetInput` minus `ownerId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: MetafieldType,
    pub value: String,
}
