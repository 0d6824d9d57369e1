//! ACME Core - Shared domain types.
//!
//! This crate provides the types used by the storefront binary and its tests:
//! - checkout draft state and its transition function
//! - price formatting for cart totals
//! - sidebar views and the wishlist
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, checkout draft, sidebar views, wishlist

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
