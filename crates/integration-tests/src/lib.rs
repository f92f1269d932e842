//! Test support for the Meridian storefront core.
//!
//! [`FakePricingService`] is an in-memory [`PricingApi`] implementation
//! with the real pricing rules: 18% GST on the post-discount amount, a
//! flat shipping charge below the free-shipping threshold, percentage
//! coupons (exclusive, replace-on-reapply), and line merging on repeated
//! adds of the same catalog item. It lets scenario tests drive the engines
//! through full round trips without a network.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use meridian_core::{ItemId, ItemType, LineId, OrderId, SessionId};
use meridian_storefront::pricing::{
    AddItemRequest, ApiError, CartItem, CartSnapshot, CartTotals, Coupon, OrderConfirmation,
    OrderRequest, PricingApi, WishlistAddRequest, WishlistItem,
};

/// GST rate applied to the post-discount amount, in percent.
pub const GST_RATE_PERCENT: i64 = 18;
/// Orders at or above this post-discount amount ship free.
pub const FREE_SHIPPING_THRESHOLD: i64 = 5_000;
/// Flat delivery charge below the threshold.
pub const SHIPPING_FLAT: i64 = 99;

/// Initialize a tracing subscriber for test output. Safe to call from
/// every test; only the first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assert the server-side totals invariant on a snapshot:
/// `subtotal == Σ price*quantity` and
/// `total == subtotal - discount + gst + shipping`.
pub fn assert_totals_consistent(snapshot: &CartSnapshot) {
    let subtotal: i64 = snapshot
        .items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum();
    let item_count: u32 = snapshot.items.iter().map(|item| item.quantity).sum();

    assert_eq!(snapshot.totals.subtotal, subtotal, "subtotal mismatch");
    assert_eq!(snapshot.totals.item_count, item_count, "itemCount mismatch");
    assert_eq!(
        snapshot.totals.total,
        snapshot.totals.subtotal - snapshot.totals.discount
            + snapshot.totals.gst
            + snapshot.totals.shipping,
        "total mismatch"
    );
}

/// One catalog entry the fake can sell.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Display name.
    pub name: String,
    /// Vehicle or part.
    pub item_type: ItemType,
    /// Unit price, integer currency units.
    pub price: i64,
    /// Original list price.
    pub mrp: Option<i64>,
}

/// A percentage coupon the fake accepts.
#[derive(Debug, Clone)]
pub struct CouponRule {
    /// Discount percentage (e.g., 10 for 10% off).
    pub percent: i64,
    /// Effect summary returned to the client.
    pub description: String,
    /// Minimum subtotal for eligibility.
    pub min_subtotal: i64,
}

#[derive(Debug, Default)]
struct SessionState {
    lines: Vec<CartItem>,
    coupon: Option<String>,
    wishlist: Vec<WishlistItem>,
}

/// In-memory Pricing Service with real pricing rules.
#[derive(Debug, Default)]
pub struct FakePricingService {
    catalog: HashMap<ItemId, CatalogEntry>,
    coupons: HashMap<String, CouponRule>,
    sessions: Mutex<HashMap<String, SessionState>>,
    next_line: AtomicU64,
    next_order: AtomicU64,
    orders_fail: AtomicBool,
}

impl FakePricingService {
    /// An empty service with no catalog and no coupons.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A service pre-seeded with a small parts-and-vehicles catalog and a
    /// `SAVE10` coupon.
    #[must_use]
    pub fn seeded() -> Self {
        let mut service = Self::new();
        service.add_catalog_entry("PART-OIL", ItemType::Part, "Oil Filter", 450, Some(500));
        service.add_catalog_entry("PART-PAD", ItemType::Part, "Brake Pad Set", 2_500, None);
        service.add_catalog_entry("PART-BAT", ItemType::Part, "Battery 12V", 6_200, Some(6_800));
        service.add_catalog_entry("CAR-GT", ItemType::Car, "Meridian GT", 4_200_000, None);
        service.add_coupon("SAVE10", 10, "10% off your order", 1_000);
        service
    }

    /// Add a catalog entry.
    pub fn add_catalog_entry(
        &mut self,
        item_id: &str,
        item_type: ItemType,
        name: &str,
        price: i64,
        mrp: Option<i64>,
    ) {
        self.catalog.insert(
            ItemId::new(item_id),
            CatalogEntry {
                name: name.to_string(),
                item_type,
                price,
                mrp,
            },
        );
    }

    /// Register a percentage coupon.
    pub fn add_coupon(&mut self, code: &str, percent: i64, description: &str, min_subtotal: i64) {
        self.coupons.insert(
            code.to_uppercase(),
            CouponRule {
                percent,
                description: description.to_string(),
                min_subtotal,
            },
        );
    }

    /// Make subsequent order creations fail with a rejection.
    pub fn set_orders_fail(&self, fail: bool) {
        self.orders_fail.store(fail, Ordering::Release);
    }

    /// Number of carts currently held server-side.
    #[must_use]
    pub fn cart_count(&self) -> usize {
        self.lock_sessions()
            .values()
            .filter(|s| !s.lines.is_empty())
            .count()
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionState>> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn compute_totals(&self, state: &SessionState) -> (CartTotals, Option<Coupon>) {
        let subtotal: i64 = state
            .lines
            .iter()
            .map(|line| line.price * i64::from(line.quantity))
            .sum();
        let item_count: u32 = state.lines.iter().map(|line| line.quantity).sum();

        let coupon = state
            .coupon
            .as_ref()
            .and_then(|code| self.coupons.get(code).map(|rule| (code, rule)));
        let discount = coupon.map_or(0, |(_, rule)| subtotal * rule.percent / 100);

        let taxable = subtotal - discount;
        let gst = taxable * GST_RATE_PERCENT / 100;
        let shipping = if state.lines.is_empty() || taxable >= FREE_SHIPPING_THRESHOLD {
            0
        } else {
            SHIPPING_FLAT
        };

        let totals = CartTotals {
            subtotal,
            discount,
            gst,
            shipping,
            total: subtotal - discount + gst + shipping,
            item_count,
        };
        let coupon = coupon.map(|(code, rule)| Coupon {
            code: code.clone(),
            description: rule.description.clone(),
        });
        (totals, coupon)
    }

    fn snapshot_of(&self, state: &SessionState) -> CartSnapshot {
        let (totals, coupon) = self.compute_totals(state);
        CartSnapshot {
            items: state.lines.clone(),
            totals,
            coupon,
        }
    }

    fn with_session<T>(
        &self,
        session: &SessionId,
        f: impl FnOnce(&mut SessionState) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut sessions = self.lock_sessions();
        let state = sessions.entry(session.as_str().to_string()).or_default();
        f(state)
    }

    fn snapshot_for(&self, session: &SessionId) -> CartSnapshot {
        let mut sessions = self.lock_sessions();
        let state = sessions.entry(session.as_str().to_string()).or_default();
        self.snapshot_of(state)
    }
}

impl PricingApi for FakePricingService {
    async fn get_cart(&self, session: &SessionId) -> Result<CartSnapshot, ApiError> {
        Ok(self.snapshot_for(session))
    }

    async fn add_item(
        &self,
        session: &SessionId,
        request: &AddItemRequest,
    ) -> Result<CartSnapshot, ApiError> {
        let entry = self
            .catalog
            .get(&request.item_id)
            .ok_or_else(|| ApiError::Rejected(format!("Unknown item: {}", request.item_id)))?
            .clone();

        let line_id = LineId::new(format!(
            "line_{}",
            self.next_line.fetch_add(1, Ordering::Relaxed) + 1
        ));

        self.with_session(session, |state| {
            // Merge into an existing line for the same catalog item
            if let Some(line) = state
                .lines
                .iter_mut()
                .find(|line| line.item_id == request.item_id)
            {
                line.quantity += request.quantity;
            } else {
                state.lines.push(CartItem {
                    id: line_id,
                    item_id: request.item_id.clone(),
                    item_type: entry.item_type,
                    name: entry.name.clone(),
                    image: format!("https://cdn.example.com/{}.jpg", request.item_id),
                    variant: None,
                    color: None,
                    part_number: None,
                    price: entry.price,
                    mrp: entry.mrp,
                    quantity: request.quantity,
                });
            }
            Ok(())
        })?;

        Ok(self.snapshot_for(session))
    }

    async fn update_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<CartSnapshot, ApiError> {
        self.with_session(session, |state| {
            let line = state
                .lines
                .iter_mut()
                .find(|line| &line.id == line_id)
                .ok_or_else(|| ApiError::Rejected("Cart line not found".to_string()))?;
            line.quantity = quantity;
            Ok(())
        })?;

        Ok(self.snapshot_for(session))
    }

    async fn remove_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
    ) -> Result<CartSnapshot, ApiError> {
        // Removing an id that no longer exists is a no-op
        self.with_session(session, |state| {
            state.lines.retain(|line| &line.id != line_id);
            Ok(())
        })?;

        Ok(self.snapshot_for(session))
    }

    async fn apply_coupon(
        &self,
        session: &SessionId,
        code: &str,
    ) -> Result<CartSnapshot, ApiError> {
        let code = code.to_uppercase();
        let rule = self
            .coupons
            .get(&code)
            .ok_or_else(|| ApiError::Rejected("Invalid coupon code".to_string()))?;

        self.with_session(session, |state| {
            let subtotal: i64 = state
                .lines
                .iter()
                .map(|line| line.price * i64::from(line.quantity))
                .sum();
            if subtotal < rule.min_subtotal {
                return Err(ApiError::Rejected(format!(
                    "Coupon requires a minimum order of {}",
                    rule.min_subtotal
                )));
            }
            // Exclusive: replaces any previously active coupon
            state.coupon = Some(code.clone());
            Ok(())
        })?;

        Ok(self.snapshot_for(session))
    }

    async fn remove_coupon(&self, session: &SessionId) -> Result<CartSnapshot, ApiError> {
        self.with_session(session, |state| {
            state.coupon = None;
            Ok(())
        })?;

        Ok(self.snapshot_for(session))
    }

    async fn clear_cart(&self, session: &SessionId) -> Result<(), ApiError> {
        self.with_session(session, |state| {
            state.lines.clear();
            state.coupon = None;
            Ok(())
        })
    }

    async fn get_wishlist(&self, session: &SessionId) -> Result<Vec<WishlistItem>, ApiError> {
        self.with_session(session, |state| Ok(state.wishlist.clone()))
    }

    async fn add_to_wishlist(
        &self,
        session: &SessionId,
        request: &WishlistAddRequest,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        let entry = self
            .catalog
            .get(&request.item_id)
            .ok_or_else(|| ApiError::Rejected(format!("Unknown item: {}", request.item_id)))?
            .clone();

        self.with_session(session, |state| {
            // Set semantics: no duplicate entries for the same catalog item
            if !state
                .wishlist
                .iter()
                .any(|item| item.item_id == request.item_id)
            {
                state.wishlist.push(WishlistItem {
                    item_id: request.item_id.clone(),
                    item_type: entry.item_type,
                    name: entry.name.clone(),
                    price: entry.price,
                    original_price: entry.mrp,
                    image: format!("https://cdn.example.com/{}.jpg", request.item_id),
                    brand: None,
                });
            }
            Ok(state.wishlist.clone())
        })
    }

    async fn remove_from_wishlist(
        &self,
        session: &SessionId,
        item_id: &ItemId,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        self.with_session(session, |state| {
            state.wishlist.retain(|item| &item.item_id != item_id);
            Ok(state.wishlist.clone())
        })
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        if self.orders_fail.load(Ordering::Acquire) {
            return Err(ApiError::Rejected("Payment could not be processed".to_string()));
        }
        if request.items.is_empty() {
            return Err(ApiError::Rejected("Cannot order an empty cart".to_string()));
        }

        let n = self.next_order.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(OrderConfirmation {
            order_id: OrderId::new(format!("ORD_{n:06}")),
            status: Some("confirmed".to_string()),
        })
    }
}
