//! MycoPet Core - Shared types and field coercion.
//!
//! This crate provides the types used across the MycoPet profile relay:
//! - `relay` - HTTP service that writes customer profile metafields to Shopify
//! - `cli` - Operator tooling for previewing and replaying updates
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything here is deterministic and testable without a network.
//!
//! # Modules
//!
//! - [`types`] - Update payloads, metafield types, and the customer reference
//! - [`transform`] - Coercion of raw profile fields into typed metafields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod transform;
pub mod types;

pub use transform::{TransformError, transform_fields};
pub use types::*;
