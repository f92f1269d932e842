//! Server-confirmed wishlist state engine.
//!
//! Simpler sibling of the cart engine: a per-session set of saved catalog
//! references with the same full-replace-on-mutation discipline and no
//! pricing concerns. Membership checks are pure local predicates over the
//! current snapshot.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use meridian_core::{ItemId, ItemType, SessionId};
use thiserror::Error;
use tracing::instrument;

use crate::pricing::{ApiError, PricingApi, WishlistAddRequest, WishlistItem};

/// Errors surfaced by wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// Business-rule rejection with the server's reason.
    #[error("{0}")]
    Rejected(String),

    /// Network/transport failure; local state retains the last-known-good
    /// snapshot.
    #[error("Pricing Service unavailable: {0}")]
    Transport(String),
}

impl From<ApiError> for WishlistError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(message) => Self::Rejected(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug)]
struct WishlistState {
    items: Vec<WishlistItem>,
    installed_seq: u64,
    last_error: Option<String>,
}

/// Reconciling state holder for one wishlist.
#[derive(Debug)]
pub struct WishlistEngine<P> {
    api: P,
    session: SessionId,
    state: Mutex<WishlistState>,
    in_flight: AtomicUsize,
    next_seq: AtomicU64,
}

impl<P: PricingApi> WishlistEngine<P> {
    /// Create an engine for the given session, starting empty.
    pub fn new(api: P, session: SessionId) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(WishlistState {
                items: Vec::new(),
                installed_seq: 0,
                last_error: None,
            }),
            in_flight: AtomicUsize::new(0),
            next_seq: AtomicU64::new(1),
        }
    }

    /// The session this engine is bound to.
    #[must_use]
    pub const fn session(&self) -> &SessionId {
        &self.session
    }

    /// Clone of the current saved items.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.lock_state().items.clone()
    }

    /// Number of saved items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().items.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().items.is_empty()
    }

    /// Pure local membership test over the current snapshot - no server
    /// round trip.
    #[must_use]
    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.lock_state()
            .items
            .iter()
            .any(|item| &item.item_id == item_id)
    }

    /// Whether any operation is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Message from the most recent transport failure.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Replace the local snapshot from the server.
    ///
    /// # Errors
    ///
    /// On failure the prior snapshot is left untouched.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn fetch(&self) -> Result<(), WishlistError> {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self.api.get_wishlist(&self.session).await;
        self.complete(seq, result)
    }

    /// Save a catalog item.
    ///
    /// Set semantics: adding an item that is already saved does not create
    /// a duplicate (server-enforced; the returned list is installed as-is).
    ///
    /// # Errors
    ///
    /// Follows the rejected/transport split.
    #[instrument(skip(self), fields(session = %self.session, item_id = %item_id))]
    pub async fn add(&self, item_id: ItemId, item_type: ItemType) -> Result<(), WishlistError> {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let request = WishlistAddRequest { item_id, item_type };
        let result = self.api.add_to_wishlist(&self.session, &request).await;
        self.complete(seq, result)
    }

    /// Remove a catalog item.
    ///
    /// # Errors
    ///
    /// Follows the rejected/transport split; removing an absent item is a
    /// server-side no-op.
    #[instrument(skip(self), fields(session = %self.session, item_id = %item_id))]
    pub async fn remove(&self, item_id: &ItemId) -> Result<(), WishlistError> {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self.api.remove_from_wishlist(&self.session, item_id).await;
        self.complete(seq, result)
    }

    fn take_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, WishlistState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn complete(
        &self,
        seq: u64,
        result: Result<Vec<WishlistItem>, ApiError>,
    ) -> Result<(), WishlistError> {
        match result {
            Ok(items) => {
                let mut state = self.lock_state();
                if seq >= state.installed_seq {
                    state.items = items;
                    state.installed_seq = seq;
                    state.last_error = None;
                }
                Ok(())
            }
            Err(ApiError::Rejected(message)) => Err(WishlistError::Rejected(message)),
            Err(other) => {
                let message = other.to_string();
                self.lock_state().last_error = Some(message.clone());
                Err(WishlistError::Transport(message))
            }
        }
    }
}

/// RAII guard for the in-flight operation counter.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pricing::{
        AddItemRequest, CartSnapshot, OrderConfirmation, OrderRequest,
    };
    use meridian_core::LineId;

    /// Fake that maintains a real per-session set, so membership semantics
    /// are exercised end to end.
    #[derive(Default)]
    struct SetApi {
        items: Mutex<Vec<WishlistItem>>,
    }

    impl SetApi {
        fn list(&self) -> Vec<WishlistItem> {
            self.items.lock().unwrap().clone()
        }
    }

    fn saved(item_id: &ItemId, item_type: ItemType) -> WishlistItem {
        WishlistItem {
            item_id: item_id.clone(),
            item_type,
            name: format!("Item {item_id}"),
            price: 999,
            original_price: None,
            image: "https://cdn.example.com/item.jpg".to_string(),
            brand: None,
        }
    }

    impl PricingApi for SetApi {
        async fn get_cart(&self, _session: &SessionId) -> Result<CartSnapshot, ApiError> {
            Ok(CartSnapshot::empty())
        }

        async fn add_item(
            &self,
            _session: &SessionId,
            _request: &AddItemRequest,
        ) -> Result<CartSnapshot, ApiError> {
            Ok(CartSnapshot::empty())
        }

        async fn update_line(
            &self,
            _session: &SessionId,
            _line_id: &LineId,
            _quantity: u32,
        ) -> Result<CartSnapshot, ApiError> {
            Ok(CartSnapshot::empty())
        }

        async fn remove_line(
            &self,
            _session: &SessionId,
            _line_id: &LineId,
        ) -> Result<CartSnapshot, ApiError> {
            Ok(CartSnapshot::empty())
        }

        async fn apply_coupon(
            &self,
            _session: &SessionId,
            _code: &str,
        ) -> Result<CartSnapshot, ApiError> {
            Ok(CartSnapshot::empty())
        }

        async fn remove_coupon(&self, _session: &SessionId) -> Result<CartSnapshot, ApiError> {
            Ok(CartSnapshot::empty())
        }

        async fn clear_cart(&self, _session: &SessionId) -> Result<(), ApiError> {
            Ok(())
        }

        async fn get_wishlist(&self, _session: &SessionId) -> Result<Vec<WishlistItem>, ApiError> {
            Ok(self.list())
        }

        async fn add_to_wishlist(
            &self,
            _session: &SessionId,
            request: &WishlistAddRequest,
        ) -> Result<Vec<WishlistItem>, ApiError> {
            let mut items = self.items.lock().unwrap();
            if !items.iter().any(|i| i.item_id == request.item_id) {
                items.push(saved(&request.item_id, request.item_type));
            }
            Ok(items.clone())
        }

        async fn remove_from_wishlist(
            &self,
            _session: &SessionId,
            item_id: &ItemId,
        ) -> Result<Vec<WishlistItem>, ApiError> {
            let mut items = self.items.lock().unwrap();
            items.retain(|i| &i.item_id != item_id);
            Ok(items.clone())
        }

        async fn create_order(
            &self,
            _request: &OrderRequest,
        ) -> Result<OrderConfirmation, ApiError> {
            Err(ApiError::MissingData)
        }
    }

    #[tokio::test]
    async fn test_add_reflects_membership_immediately() {
        let engine = WishlistEngine::new(SetApi::default(), SessionId::generate());
        let car = ItemId::new("CAR-9");

        assert!(!engine.contains(&car));
        engine.add(car.clone(), ItemType::Car).await.unwrap();
        assert!(engine.contains(&car));
        assert_eq!(engine.len(), 1);
    }

    #[tokio::test]
    async fn test_double_add_does_not_duplicate() {
        let engine = WishlistEngine::new(SetApi::default(), SessionId::generate());
        let part = ItemId::new("PART-1");

        engine.add(part.clone(), ItemType::Part).await.unwrap();
        engine.add(part.clone(), ItemType::Part).await.unwrap();

        assert_eq!(engine.len(), 1);
        assert!(engine.contains(&part));
    }

    #[tokio::test]
    async fn test_remove_updates_membership() {
        let engine = WishlistEngine::new(SetApi::default(), SessionId::generate());
        let part = ItemId::new("PART-1");

        engine.add(part.clone(), ItemType::Part).await.unwrap();
        engine.remove(&part).await.unwrap();

        assert!(!engine.contains(&part));
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_item_is_noop() {
        let engine = WishlistEngine::new(SetApi::default(), SessionId::generate());

        engine.remove(&ItemId::new("PART-404")).await.unwrap();
        assert!(engine.is_empty());
    }
}
