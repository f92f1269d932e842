//! Wire types for the Pricing Service API.
//!
//! These mirror the JSON contract exactly (camelCase field names, integer
//! currency units). Totals are always deserialized from the server and never
//! recomputed client-side.

use meridian_core::{ItemId, ItemType, LineId, OrderId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Envelope
// =============================================================================

/// The `{success, data, message}` envelope every endpoint responds with.
///
/// Parsing the envelope once at the client boundary replaces the shape
/// sniffing a caller would otherwise need when the server omits `data` or
/// `message`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    // `default = "Option::default"` keeps serde from inferring a
    // `T: Default` bound the client's `T: DeserializeOwned` callers
    // cannot meet.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// One line in a cart.
///
/// `id` is the server-assigned line identifier; `item_id` is the underlying
/// catalog entity. Two lines may reference the same catalog item (different
/// variants), so mutations always address the line id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Server-assigned cart line ID.
    pub id: LineId,
    /// Catalog entity this line refers to.
    pub item_id: ItemId,
    /// Whether the line is a vehicle or a part.
    pub item_type: ItemType,
    /// Display name.
    pub name: String,
    /// Product image URL.
    pub image: String,
    /// Trim/variant label (cars).
    #[serde(default)]
    pub variant: Option<String>,
    /// Selected color.
    #[serde(default)]
    pub color: Option<String>,
    /// Manufacturer part number (parts).
    #[serde(default)]
    pub part_number: Option<String>,
    /// Unit price at snapshot time, integer currency units.
    pub price: i64,
    /// Original list price, for markdown display only. `mrp >= price` when
    /// present.
    #[serde(default)]
    pub mrp: Option<i64>,
    /// Positive quantity; no zero-quantity lines exist.
    pub quantity: u32,
}

/// Server-computed cart totals.
///
/// `subtotal = Σ price * quantity`, `gst` is 18% of the post-discount
/// amount, `total = subtotal - discount + gst + shipping`. All values are
/// authoritative; the client only displays them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of `price * quantity` over all lines.
    pub subtotal: i64,
    /// Amount subtracted by the active coupon (0 if none).
    pub discount: i64,
    /// Tax on the post-discount amount.
    pub gst: i64,
    /// Delivery charge (0 when the order qualifies for free shipping).
    pub shipping: i64,
    /// `subtotal - discount + gst + shipping`.
    pub total: i64,
    /// Sum of quantities across lines (badge count, not line count).
    pub item_count: u32,
}

impl CartTotals {
    /// The all-zero totals of an empty cart.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: 0,
            discount: 0,
            gst: 0,
            shipping: 0,
            total: 0,
            item_count: 0,
        }
    }
}

impl Default for CartTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// An applied coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon code, canonical form uppercase.
    pub code: String,
    /// Human-readable effect summary.
    pub description: String,
}

/// The full cart state returned by every cart endpoint.
///
/// This is the unit of the full-replace discipline: engines overwrite their
/// entire local state with one of these, never patch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartSnapshot {
    /// Cart lines.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Server-computed totals.
    #[serde(default)]
    pub totals: CartTotals,
    /// Active coupon, at most one. Endpoints that cannot carry a coupon
    /// (quantity update, line removal) omit the field.
    #[serde(default)]
    pub coupon: Option<Coupon>,
}

impl CartSnapshot {
    /// The empty cart: no lines, zero totals, no coupon.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// A saved catalog reference.
///
/// Wishlists have set semantics keyed by `item_id`; the server never returns
/// two entries for the same catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Catalog entity this entry refers to. Some server builds send the
    /// field as `id`, so both spellings are accepted.
    #[serde(alias = "id")]
    pub item_id: ItemId,
    /// Whether the entry is a vehicle or a part.
    pub item_type: ItemType,
    /// Display name.
    pub name: String,
    /// Current price, integer currency units.
    pub price: i64,
    /// Original price, for markdown display.
    #[serde(default)]
    pub original_price: Option<i64>,
    /// Product image URL.
    pub image: String,
    /// Brand name (parts).
    #[serde(default)]
    pub brand: Option<String>,
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Body for `POST /cart/{sessionId}/add`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Catalog entity to add.
    pub item_id: ItemId,
    /// Vehicle or part.
    pub item_type: ItemType,
    /// Quantity to add, >= 1. The server decides whether to create a new
    /// line or merge into an existing one.
    pub quantity: u32,
}

/// Body for `PATCH /cart/{sessionId}/item/{lineId}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    /// New absolute quantity, >= 1.
    pub quantity: u32,
}

/// Body for `POST /cart/{sessionId}/coupon`.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyCouponRequest {
    /// Coupon code, uppercased before sending.
    pub code: String,
}

/// Body for `POST /cart/{sessionId}/wishlist`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistAddRequest {
    /// Catalog entity to save.
    pub item_id: ItemId,
    /// Vehicle or part.
    pub item_type: ItemType,
}

// =============================================================================
// Order Types
// =============================================================================

/// Customer contact details on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone, digits only.
    pub phone: String,
}

/// Shipping address on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// 6-digit postal pincode.
    pub pincode: String,
}

/// Body for `POST /payment/order`.
///
/// A snapshot of the cart at submission time plus the accumulated checkout
/// form state. The cart itself is cleared only after the server confirms
/// the order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Cart lines at submission time.
    pub items: Vec<CartItem>,
    /// Server-computed totals at submission time.
    pub totals: CartTotals,
    /// Customer contact details.
    pub customer: Customer,
    /// Delivery address.
    pub shipping_address: ShippingAddress,
    /// Payment method tag (e.g., "card").
    pub payment_method: String,
    /// External payment gateway reference, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

/// Response `data` for a created order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Server-assigned order identifier.
    pub order_id: OrderId,
    /// Optional order status tag.
    #[serde(default)]
    pub status: Option<String>,
}
