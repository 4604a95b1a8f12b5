//! Core types for the MycoPet profile relay.
//!
//! This module provides type-safe wrappers for the relay's domain concepts.

pub mod customer;
pub mod metafield;
pub mod request;

pub use customer::{CustomerId, CustomerIdError};
pub use metafield::{DEFAULT_NAMESPACE, MetafieldType, RawField, TypedField};
pub use request::UpdateRequest;
