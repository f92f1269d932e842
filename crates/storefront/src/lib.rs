//! Meridian Storefront - client core for the Meridian Motors storefront.
//!
//! This crate is the reconciling client side of the storefront: the Pricing
//! Service (external) owns every cart and wishlist and computes all totals;
//! the engines here keep a local mirror of that state and replace it
//! wholesale with the server's response after every mutation. The client
//! never derives a total itself.
//!
//! # Components
//!
//! - [`pricing`] - REST client for the Pricing Service and the wire types
//! - [`cart`] - [`CartEngine`](cart::CartEngine), the server-confirmed cart
//!   state holder
//! - [`wishlist`] - [`WishlistEngine`](wishlist::WishlistEngine), the saved
//!   items set
//! - [`checkout`] - step validators for the checkout and service booking
//!   wizards
//! - [`config`] - environment-driven configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use meridian_core::{ItemType, SessionId};
//! use meridian_storefront::cart::CartEngine;
//! use meridian_storefront::config::StorefrontConfig;
//! use meridian_storefront::pricing::PricingClient;
//!
//! let config = StorefrontConfig::from_env()?;
//! let client = PricingClient::new(&config.pricing)?;
//! let cart = CartEngine::new(client, SessionId::generate());
//!
//! cart.fetch().await?;
//! cart.add_item(ItemId::new("PART-0042"), ItemType::Part, 2).await?;
//! assert_eq!(cart.totals().item_count, 2);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod pricing;
pub mod wishlist;
