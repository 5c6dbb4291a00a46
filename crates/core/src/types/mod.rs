//! Core types for Prasanna Farm.
//!
//! This module provides type-safe wrappers and records for the storefront
//! domain.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{Cart, CartLineItem, CartMutation, CartSummary};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{OrderConfirmation, OrderLine, ShippingAddress};
pub use price::Price;
pub use product::{Category, Product};
pub use status::*;
