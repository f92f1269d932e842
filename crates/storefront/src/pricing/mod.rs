//! Pricing Service REST client.
//!
//! # Architecture
//!
//! - The Pricing Service is the source of truth - NO local totals, every
//!   mutation returns the full authoritative cart snapshot
//! - Plain JSON REST with a `{success, data, message}` envelope, parsed once
//!   at this boundary into typed structs
//! - Cart and wishlist state is never cached (mutable, server-owned)
//!
//! # Example
//!
//! ```rust,ignore
//! use meridian_storefront::pricing::{PricingApi, PricingClient};
//!
//! let client = PricingClient::new(&config.pricing)?;
//!
//! let cart = client.get_cart(&session).await?;
//! let cart = client.add_item(&session, &AddItemRequest {
//!     item_id: ItemId::new("PART-0042"),
//!     item_type: ItemType::Part,
//!     quantity: 1,
//! }).await?;
//! ```

mod types;

pub use types::{
    AddItemRequest, ApplyCouponRequest, CartItem, CartSnapshot, CartTotals, Coupon, Customer,
    OrderConfirmation, OrderRequest, ShippingAddress, UpdateQuantityRequest, WishlistAddRequest,
    WishlistItem,
};

use std::sync::Arc;

use meridian_core::{ItemId, LineId, SessionId};
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use crate::config::PricingApiConfig;
use types::Envelope;

/// Errors that can occur when calling the Pricing Service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (transport-level).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Business-rule rejection (`success: false` envelope) with the
    /// server's human-readable reason.
    #[error("{0}")]
    Rejected(String),

    /// Envelope reported success but carried no data where some was
    /// required.
    #[error("response envelope is missing data")]
    MissingData,
}

impl ApiError {
    /// Whether this error is a business-rule rejection rather than a
    /// transport or contract failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

// =============================================================================
// PricingApi trait
// =============================================================================

/// The Pricing Service operations the engines depend on.
///
/// [`PricingClient`] is the production implementation; tests substitute an
/// in-memory fake. Every cart-mutating operation returns the full
/// authoritative [`CartSnapshot`], never a delta.
#[allow(async_fn_in_trait)]
pub trait PricingApi {
    /// Fetch the cart for a session, creating it lazily server-side.
    async fn get_cart(&self, session: &SessionId) -> Result<CartSnapshot, ApiError>;

    /// Add an item; the server decides whether to merge into an existing
    /// line.
    async fn add_item(
        &self,
        session: &SessionId,
        request: &AddItemRequest,
    ) -> Result<CartSnapshot, ApiError>;

    /// Set the absolute quantity of one cart line.
    async fn update_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<CartSnapshot, ApiError>;

    /// Remove one cart line.
    async fn remove_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
    ) -> Result<CartSnapshot, ApiError>;

    /// Apply a coupon code; replaces any previously active coupon.
    async fn apply_coupon(
        &self,
        session: &SessionId,
        code: &str,
    ) -> Result<CartSnapshot, ApiError>;

    /// Remove the active coupon.
    async fn remove_coupon(&self, session: &SessionId) -> Result<CartSnapshot, ApiError>;

    /// Destroy the cart server-side.
    async fn clear_cart(&self, session: &SessionId) -> Result<(), ApiError>;

    /// Fetch the wishlist for a session.
    async fn get_wishlist(&self, session: &SessionId) -> Result<Vec<WishlistItem>, ApiError>;

    /// Save a catalog item to the wishlist (set semantics).
    async fn add_to_wishlist(
        &self,
        session: &SessionId,
        request: &WishlistAddRequest,
    ) -> Result<Vec<WishlistItem>, ApiError>;

    /// Remove a catalog item from the wishlist.
    async fn remove_from_wishlist(
        &self,
        session: &SessionId,
        item_id: &ItemId,
    ) -> Result<Vec<WishlistItem>, ApiError>;

    /// Create an order from a cart snapshot plus checkout form state.
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ApiError>;
}

/// Engines own their API handle; a shared reference delegates, so one
/// client (or one test fake) can back several engines.
impl<P: PricingApi> PricingApi for &P {
    async fn get_cart(&self, session: &SessionId) -> Result<CartSnapshot, ApiError> {
        (**self).get_cart(session).await
    }

    async fn add_item(
        &self,
        session: &SessionId,
        request: &AddItemRequest,
    ) -> Result<CartSnapshot, ApiError> {
        (**self).add_item(session, request).await
    }

    async fn update_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<CartSnapshot, ApiError> {
        (**self).update_line(session, line_id, quantity).await
    }

    async fn remove_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
    ) -> Result<CartSnapshot, ApiError> {
        (**self).remove_line(session, line_id).await
    }

    async fn apply_coupon(
        &self,
        session: &SessionId,
        code: &str,
    ) -> Result<CartSnapshot, ApiError> {
        (**self).apply_coupon(session, code).await
    }

    async fn remove_coupon(&self, session: &SessionId) -> Result<CartSnapshot, ApiError> {
        (**self).remove_coupon(session).await
    }

    async fn clear_cart(&self, session: &SessionId) -> Result<(), ApiError> {
        (**self).clear_cart(session).await
    }

    async fn get_wishlist(&self, session: &SessionId) -> Result<Vec<WishlistItem>, ApiError> {
        (**self).get_wishlist(session).await
    }

    async fn add_to_wishlist(
        &self,
        session: &SessionId,
        request: &WishlistAddRequest,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        (**self).add_to_wishlist(session, request).await
    }

    async fn remove_from_wishlist(
        &self,
        session: &SessionId,
        item_id: &ItemId,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        (**self).remove_from_wishlist(session, item_id).await
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        (**self).create_order(request).await
    }
}

// =============================================================================
// PricingClient
// =============================================================================

/// HTTP client for the Pricing Service.
///
/// Cheaply cloneable via `Arc`. Requests carry a configurable timeout so a
/// hanging server cannot leave an engine loading indefinitely.
#[derive(Debug, Clone)]
pub struct PricingClient {
    inner: Arc<PricingClientInner>,
}

#[derive(Debug)]
struct PricingClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PricingClient {
    /// Create a new Pricing Service client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &PricingApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(PricingClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                api_key: config
                    .api_key
                    .as_ref()
                    .map(|key| key.expose_secret().to_string()),
            }),
        })
    }

    /// Execute one request and unwrap the response envelope.
    ///
    /// Returns the envelope's `data`, which may legitimately be absent
    /// (e.g., the clear-cart endpoint).
    async fn call<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.inner.base_url);

        let mut request = self.inner.client.request(method, &url);
        if let Some(key) = &self.inner.api_key {
            request = request.header("X-Api-Key", key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Pricing Service returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let envelope: Envelope<T> = match serde_json::from_str(&response_text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Pricing Service response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Request rejected".to_string()),
            ));
        }

        Ok(envelope.data)
    }

    /// Like [`Self::call`], but the endpoint must return data.
    async fn call_expecting<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(method, path, body)
            .await?
            .ok_or(ApiError::MissingData)
    }
}

/// Body type for endpoints that take none.
const NO_BODY: Option<&()> = None;

impl PricingApi for PricingClient {
    #[instrument(skip(self), fields(session = %session))]
    async fn get_cart(&self, session: &SessionId) -> Result<CartSnapshot, ApiError> {
        self.call_expecting(Method::GET, &format!("/cart/{session}"), NO_BODY)
            .await
    }

    #[instrument(skip(self, request), fields(session = %session, item_id = %request.item_id))]
    async fn add_item(
        &self,
        session: &SessionId,
        request: &AddItemRequest,
    ) -> Result<CartSnapshot, ApiError> {
        self.call_expecting(Method::POST, &format!("/cart/{session}/add"), Some(request))
            .await
    }

    #[instrument(skip(self), fields(session = %session, line_id = %line_id))]
    async fn update_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
        quantity: u32,
    ) -> Result<CartSnapshot, ApiError> {
        self.call_expecting(
            Method::PATCH,
            &format!("/cart/{session}/item/{line_id}"),
            Some(&UpdateQuantityRequest { quantity }),
        )
        .await
    }

    #[instrument(skip(self), fields(session = %session, line_id = %line_id))]
    async fn remove_line(
        &self,
        session: &SessionId,
        line_id: &LineId,
    ) -> Result<CartSnapshot, ApiError> {
        self.call_expecting(
            Method::DELETE,
            &format!("/cart/{session}/item/{line_id}"),
            NO_BODY,
        )
        .await
    }

    #[instrument(skip(self), fields(session = %session))]
    async fn apply_coupon(
        &self,
        session: &SessionId,
        code: &str,
    ) -> Result<CartSnapshot, ApiError> {
        self.call_expecting(
            Method::POST,
            &format!("/cart/{session}/coupon"),
            Some(&ApplyCouponRequest {
                code: code.to_string(),
            }),
        )
        .await
    }

    #[instrument(skip(self), fields(session = %session))]
    async fn remove_coupon(&self, session: &SessionId) -> Result<CartSnapshot, ApiError> {
        self.call_expecting(Method::DELETE, &format!("/cart/{session}/coupon"), NO_BODY)
            .await
    }

    #[instrument(skip(self), fields(session = %session))]
    async fn clear_cart(&self, session: &SessionId) -> Result<(), ApiError> {
        // The clear endpoint responds with an empty envelope
        self.call::<serde_json::Value, ()>(Method::DELETE, &format!("/cart/{session}"), NO_BODY)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(session = %session))]
    async fn get_wishlist(&self, session: &SessionId) -> Result<Vec<WishlistItem>, ApiError> {
        self.call_expecting(Method::GET, &format!("/cart/{session}/wishlist"), NO_BODY)
            .await
    }

    #[instrument(skip(self, request), fields(session = %session, item_id = %request.item_id))]
    async fn add_to_wishlist(
        &self,
        session: &SessionId,
        request: &WishlistAddRequest,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        self.call_expecting(
            Method::POST,
            &format!("/cart/{session}/wishlist"),
            Some(request),
        )
        .await
    }

    #[instrument(skip(self), fields(session = %session, item_id = %item_id))]
    async fn remove_from_wishlist(
        &self,
        session: &SessionId,
        item_id: &ItemId,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        self.call_expecting(
            Method::DELETE,
            &format!("/cart/{session}/wishlist/{item_id}"),
            NO_BODY,
        )
        .await
    }

    #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        self.call_expecting(Method::POST, "/payment/order", Some(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected("Invalid coupon code".to_string());
        assert_eq!(err.to_string(), "Invalid coupon code");
        assert!(err.is_rejection());

        let err = ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_missing_data_display() {
        assert_eq!(
            ApiError::MissingData.to_string(),
            "response envelope is missing data"
        );
    }
}
