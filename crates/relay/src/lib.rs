//! MycoPet profile relay library.
//!
//! Receives pet-profile submissions from the storefront and writes them to
//! the matching Shopify customer as typed metafields.
//!
//! # Security
//!
//! This crate holds a HIGH PRIVILEGE Shopify Admin API token. The optional
//! proxy-host filter is a string match on a client-supplied header and does
//! not authenticate callers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
