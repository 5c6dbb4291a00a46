//! Session cart with remote/local reconciliation.
//!
//! # Modules
//!
//! - `strategy` - Remote and local apply strategies
//! - `manager` - [`CartManager`], the session-scoped cart owner

mod manager;
mod strategy;

pub use manager::CartManager;
pub use strategy::{CartStrategy, CartUpdate, LocalCartStrategy, RemoteCartStrategy};
