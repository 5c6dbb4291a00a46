//! Prasanna Farm Core - Shared domain types.
//!
//! This crate provides the types used across the Prasanna Farm components:
//! - `storefront` - Catalog, cart state manager, checkout simulation
//! - `cli` - Command-line front end driving one storefront session
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no persistence. The cart merge rules live here so that every
//! caller (local fallback, tests, fake services) applies the same arithmetic.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, products, categories, carts, orders, emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
