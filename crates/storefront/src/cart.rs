//! Server-confirmed cart state engine.
//!
//! The Pricing Service owns the cart; [`CartEngine`] keeps a local mirror
//! and replaces it wholesale with the server's snapshot after every
//! successful mutation. It never computes a total itself, so the client can
//! never display a derived value the server would disagree with.
//!
//! Failed operations leave the last-known-good snapshot untouched: a fetch
//! error must not flash an empty cart, and a rejected mutation must not
//! corrupt totals.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use meridian_core::{ItemId, ItemType, LineId, SessionId};
use thiserror::Error;
use tracing::instrument;

use crate::pricing::{
    AddItemRequest, ApiError, CartItem, CartSnapshot, CartTotals, Coupon, OrderConfirmation,
    OrderRequest, PricingApi,
};

/// Errors surfaced by cart operations.
///
/// Expected failure modes never panic; callers get a discriminated result
/// they can render inline.
#[derive(Debug, Error)]
pub enum CartError {
    /// Business-rule rejection with the server's human-readable reason
    /// (invalid coupon, insufficient stock, bad input). Local state is
    /// unchanged.
    #[error("{0}")]
    Rejected(String),

    /// Network/transport failure or a malformed response. Local state
    /// retains the last-known-good snapshot.
    #[error("Pricing Service unavailable: {0}")]
    Transport(String),
}

impl From<ApiError> for CartError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(message) => Self::Rejected(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug)]
struct CartState {
    snapshot: CartSnapshot,
    /// Sequence number of the request whose response is currently
    /// installed. Responses older than this are stale and discarded.
    installed_seq: u64,
    last_error: Option<String>,
}

/// Reconciling state holder for one cart.
///
/// Keyed by an explicitly injected [`SessionId`]; overlapping operations
/// are permitted (each is an independent request/response pair), and a
/// monotonic sequence guard ensures an out-of-order response can never
/// overwrite fresher state.
#[derive(Debug)]
pub struct CartEngine<P> {
    api: P,
    session: SessionId,
    state: Mutex<CartState>,
    in_flight: AtomicUsize,
    next_seq: AtomicU64,
}

impl<P: PricingApi> CartEngine<P> {
    /// Create an engine for the given session, starting from the empty
    /// snapshot.
    pub fn new(api: P, session: SessionId) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(CartState {
                snapshot: CartSnapshot::empty(),
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

    /// Clone of the current local snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.lock_state().snapshot.clone()
    }

    /// Clone of the current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock_state().snapshot.items.clone()
    }

    /// Current server-computed totals.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.lock_state().snapshot.totals
    }

    /// Currently active coupon, if any.
    #[must_use]
    pub fn coupon(&self) -> Option<Coupon> {
        self.lock_state().snapshot.coupon.clone()
    }

    /// Whether any operation is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Message from the most recent transport failure, cleared by the next
    /// successful operation.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Replace the local snapshot from the server.
    ///
    /// # Errors
    ///
    /// On failure the prior snapshot is left untouched and the error is
    /// recorded; the cart is never cleared by a failed fetch.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn fetch(&self) -> Result<(), CartError> {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self.api.get_cart(&self.session).await;
        self.complete(seq, result)
    }

    /// Add an item to the cart.
    ///
    /// The server decides whether to create a new line or merge into an
    /// existing line for the same item/variant; the client has no merge
    /// logic.
    ///
    /// # Errors
    ///
    /// Rejects `quantity == 0` locally; other failures follow the usual
    /// rejected/transport split without destroying local state.
    #[instrument(skip(self), fields(session = %self.session, item_id = %item_id))]
    pub async fn add_item(
        &self,
        item_id: ItemId,
        item_type: ItemType,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::Rejected(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let request = AddItemRequest {
            item_id,
            item_type,
            quantity,
        };
        let result = self.api.add_item(&self.session, &request).await;
        self.complete(seq, result)
    }

    /// Set the absolute quantity of one cart line.
    ///
    /// Addresses the server-assigned line id, never the catalog item id:
    /// two lines may reference the same catalog item and must be mutated
    /// independently.
    ///
    /// # Errors
    ///
    /// `new_quantity` must be >= 1; removing a line entirely is
    /// [`Self::remove_item`]'s job, there is no zero special case here.
    #[instrument(skip(self), fields(session = %self.session, line_id = %line_id))]
    pub async fn update_quantity(
        &self,
        line_id: &LineId,
        new_quantity: u32,
    ) -> Result<(), CartError> {
        if new_quantity == 0 {
            return Err(CartError::Rejected(
                "Quantity must be at least 1; remove the line instead".to_string(),
            ));
        }

        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self
            .api
            .update_line(&self.session, line_id, new_quantity)
            .await;
        self.complete(seq, result)
    }

    /// Remove one cart line; the server recomputes totals.
    ///
    /// # Errors
    ///
    /// Follows the rejected/transport split. Removing an id that no longer
    /// exists is handled by the server; whatever snapshot it returns is
    /// installed as usual.
    #[instrument(skip(self), fields(session = %self.session, line_id = %line_id))]
    pub async fn remove_item(&self, line_id: &LineId) -> Result<(), CartError> {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self.api.remove_line(&self.session, line_id).await;
        self.complete(seq, result)
    }

    /// Apply a coupon code.
    ///
    /// The code is uppercased before sending. At most one coupon is active
    /// at a time; applying while another is active replaces it
    /// (server-enforced).
    ///
    /// # Errors
    ///
    /// An ineligible or unknown code comes back as
    /// [`CartError::Rejected`] with the server's reason, leaving state
    /// unchanged.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn apply_coupon(&self, code: &str) -> Result<(), CartError> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(CartError::Rejected("Coupon code is required".to_string()));
        }

        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self.api.apply_coupon(&self.session, &code).await;
        self.complete(seq, result)
    }

    /// Remove the active coupon; the server recomputes totals without the
    /// discount.
    ///
    /// # Errors
    ///
    /// Follows the rejected/transport split.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn remove_coupon(&self) -> Result<(), CartError> {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        let result = self.api.remove_coupon(&self.session).await;
        self.complete(seq, result)
    }

    /// Empty the cart, resetting local state to the zero snapshot.
    ///
    /// The local reset happens even if the server call fails: after a
    /// confirmed order the UI must not keep showing a paid-for cart. A
    /// server-side failure is logged, not surfaced.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn clear(&self) {
        let seq = self.take_seq();
        let _guard = InFlightGuard::enter(&self.in_flight);

        if let Err(e) = self.api.clear_cart(&self.session).await {
            tracing::warn!("Failed to clear cart server-side: {e}");
        }

        let mut state = self.lock_state();
        // The zero snapshot supersedes any response still in flight.
        if seq >= state.installed_seq {
            state.snapshot = CartSnapshot::empty();
            state.installed_seq = seq;
            state.last_error = None;
        }
    }

    /// Create an order from the given request, clearing the cart only
    /// after the server confirms persistence.
    ///
    /// # Errors
    ///
    /// On failure the cart is left intact so the caller can retry; no
    /// fabricated confirmation is ever produced.
    #[instrument(skip(self, request), fields(session = %self.session))]
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, CartError> {
        let _guard = InFlightGuard::enter(&self.in_flight);

        let confirmation = self.api.create_order(request).await?;
        self.clear().await;
        Ok(confirmation)
    }

    fn take_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Install a successful snapshot or record the failure.
    fn complete(&self, seq: u64, result: Result<CartSnapshot, ApiError>) -> Result<(), CartError> {
        match result {
            Ok(snapshot) => {
                let mut state = self.lock_state();
                if seq >= state.installed_seq {
                    state.snapshot = snapshot;
                    state.installed_seq = seq;
                    state.last_error = None;
                } else {
                    tracing::debug!(
                        seq,
                        installed = state.installed_seq,
                        "Discarding stale cart response"
                    );
                }
                Ok(())
            }
            Err(ApiError::Rejected(message)) => Err(CartError::Rejected(message)),
            Err(other) => {
                let message = other.to_string();
                self.lock_state().last_error = Some(message.clone());
                Err(CartError::Transport(message))
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
