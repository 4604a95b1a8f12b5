//! Customer reference type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every Shopify customer global ID.
const CUSTOMER_GID_PREFIX: &str = "gid://shopify/Customer/";

/// Errors that can occur when parsing a [`CustomerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdError {
    /// The input string is empty.
    #[error("customer id cannot be empty")]
    Empty,
}

/// Opaque reference to a Shopify customer, resolved from an email lookup.
///
/// The value is the Shopify global ID (e.g. `gid://shopify/Customer/123`).
/// It is never interpreted beyond being non-empty; it is handed back to the
/// Admin API as the `ownerId` of a metafield write.
///
/// ```
/// use mycopet_core::CustomerId;
///
/// let id = CustomerId::parse("gid://shopify/Customer/42").unwrap();
/// assert_eq!(id.numeric_id(), Some("42"));
/// assert!(CustomerId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Parse a `CustomerId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`CustomerIdError::Empty`] if the input is empty or whitespace.
    pub fn parse(s: &str) -> Result<Self, CustomerIdError> {
        if s.trim().is_empty() {
            return Err(CustomerIdError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the global ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing numeric part of a customer GID, if it has one.
    ///
    /// The full GID is what the API expects.
    #[must_use]
    pub fn numeric_id(&self) -> Option<&str> {
        self.0.strip_prefix(CUSTOMER_GID_PREFIX)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CustomerId {
    type Err = CustomerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
