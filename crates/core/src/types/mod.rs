//! Core types for the Meridian Motors storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod card;
pub mod email;
pub mod id;
pub mod item_type;
pub mod phone;
pub mod pincode;
pub mod session;

pub use card::{CardCvc, CardError, CardExpiry, CardNumber};
pub use email::{Email, EmailError};
pub use id::*;
pub use item_type::ItemType;
pub use phone::{Phone, PhoneError};
pub use pincode::{Pincode, PincodeError};
pub use session::SessionId;
