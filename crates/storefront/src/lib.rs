//! Prasanna Farm storefront library.
//!
//! Everything a front end needs to run one shopping session: the product
//! catalog, the session cart with remote/local reconciliation, and the
//! simulated checkout.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`api`] - REST client for the optional remote service
//! - [`store`] - Local key-value persistence
//! - [`cart`] - Cart state manager
//! - [`catalog`] - Built-in catalog and remote-with-fallback reads
//! - [`checkout`] - Order placement simulation
//! - [`session`] - Wiring of the above for one session

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use session::StorefrontSession;
