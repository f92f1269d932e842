//! Meridian Core - Shared types library.
//!
//! This crate provides common types used across the Meridian Motors
//! storefront components:
//! - `storefront` - Cart, wishlist, and checkout client core
//! - `integration-tests` - Cross-component scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, sessions, and validated
//!   form values (emails, phone numbers, pincodes, card fields)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
