//! GraphQL documents sent to the Shopify Admin API.
//!
//! Both documents are named operations so the `operationName` in the
//! request envelope matches.

use graphql_client::QueryBody;
use serde::Serialize;

use mycopet_core::{CustomerId, TypedField};

/// Customer search, first match only.
pub const FIND_CUSTOMER_BY_EMAIL: &str = r"query FindCustomerByEmail($q: String!) {
  customers(first: 1, query: $q) {
    edges {
      node {
        id
      }
    }
  }
}";

/// Metafield write for a single owner.
pub const SET_CUSTOMER_METAFIELDS: &str = r"mutation SetCustomerMetafields($ownerId: ID!, $metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(ownerId: $ownerId, metafields: $metafields) {
    metafields {
      namespace
      key
      type
      value
    }
    userErrors {
      field
      message
    }
  }
}";

/// Variables for [`FIND_CUSTOMER_BY_EMAIL`].
#[derive(Debug, Serialize)]
pub struct FindCustomerVariables {
    /// Shopify search syntax, `email:<address>`.
    pub q: String,
}

/// Variables for [`SET_CUSTOMER_METAFIELDS`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMetafieldsVariables<'a> {
    pub owner_id: &'a str,
    pub metafields: &'a [TypedField],
}

/// Build the customer lookup request.
#[must_use]
pub fn find_customer_by_email(email: &str) -> QueryBody<FindCustomerVariables> {
    QueryBody {
        variables: FindCustomerVariables {
            q: format!("email:{email}"),
        },
        query: FIND_CUSTOMER_BY_EMAIL,
        operation_name: "FindCustomerByEmail",
    }
}

/// Build the metafield write request.
#[must_use]
pub fn set_customer_metafields<'a>(
    owner: &'a CustomerId,
    metafields: &'a [TypedField],
) -> QueryBody<SetMetafieldsVariables<'a>> {
    QueryBody {
        variables: SetMetafieldsVariables {
            owner_id: owner.as_str(),
            metafields,
        },
        query: SET_CUSTOMER_METAFIELDS,
        operation_name: "SetCustomerMetafields",
    }
}
