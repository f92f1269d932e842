//! Catalog item categories.

use serde::{Deserialize, Serialize};

/// The kind of catalog entity a cart or wishlist entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A vehicle from the showroom.
    Car,
    /// A spare part or accessory.
    Part,
}

impl ItemType {
    /// Wire representation of the item type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Part => "part",
        }
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
