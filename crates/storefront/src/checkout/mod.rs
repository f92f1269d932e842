//! Checkout step validator.
//!
//! A linear wizard `Contact -> Shipping -> Payment` where forward progress
//! is conditioned on per-step field validation. Validation runs only on an
//! attempted forward transition, never throws, and reports a field->message
//! map so callers can render inline errors. Backward navigation is
//! unrestricted to any earlier step.
//!
//! Submission builds the order from the accumulated form state plus the
//! current cart snapshot; the cart is cleared only after the Pricing
//! Service confirms the order.

pub mod booking;

use std::collections::BTreeMap;

use meridian_core::{CardCvc, CardExpiry, CardNumber, Email, Phone, Pincode};
use thiserror::Error;
use tracing::instrument;

use crate::cart::{CartEngine, CartError};
use crate::pricing::{Customer, OrderConfirmation, OrderRequest, PricingApi, ShippingAddress};

// =============================================================================
// Validation Errors
// =============================================================================

/// Field-level validation failures from one step.
///
/// Keys are field names, values are human-readable messages. Backed by a
/// `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// An empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// =============================================================================
// Steps & Form
// =============================================================================

/// Checkout wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    /// Contact details (email, phone).
    Contact,
    /// Shipping address.
    Shipping,
    /// Payment card details.
    Payment,
}

impl CheckoutStep {
    /// 1-based step number for progress display.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Contact => 1,
            Self::Shipping => 2,
            Self::Payment => 3,
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Contact => Self::Shipping,
            Self::Shipping | Self::Payment => Self::Payment,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Contact | Self::Shipping => Self::Contact,
            Self::Payment => Self::Shipping,
        }
    }
}

/// Raw checkout form state, as typed by the customer.
///
/// Fields stay unvalidated strings; validation happens on forward
/// transition, not on every keystroke.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    // Step 1: contact
    pub email: String,
    pub phone: String,
    // Step 2: shipping
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    // Step 3: payment
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvc: String,
    pub card_name: String,
}

// =============================================================================
// Step Validators
// =============================================================================

/// Validate step 1 (contact) fields.
#[must_use]
pub fn validate_contact(form: &CheckoutForm) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if let Err(e) = Email::parse(&form.email) {
        errors.insert("email", e.to_string());
    }
    if let Err(e) = Phone::parse(&form.phone) {
        errors.insert("phone", e.to_string());
    }

    errors
}

/// Validate step 2 (shipping) fields.
#[must_use]
pub fn validate_shipping(form: &CheckoutForm) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require_non_empty(&mut errors, "firstName", &form.first_name, "First name");
    require_non_empty(&mut errors, "lastName", &form.last_name, "Last name");
    require_non_empty(&mut errors, "address", &form.address, "Address");
    require_non_empty(&mut errors, "city", &form.city, "City");
    require_non_empty(&mut errors, "state", &form.state, "State");
    if let Err(e) = Pincode::parse(&form.pincode) {
        errors.insert("pincode", e.to_string());
    }

    errors
}

/// Validate step 3 (payment) fields.
///
/// Format validation only - no Luhn check; the charge itself is delegated
/// to the external payment service.
#[must_use]
pub fn validate_payment(form: &CheckoutForm) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if let Err(e) = CardNumber::parse(&form.card_number) {
        errors.insert("cardNumber", e.to_string());
    }
    if let Err(e) = CardExpiry::parse(&form.card_expiry) {
        errors.insert("cardExpiry", e.to_string());
    }
    if let Err(e) = CardCvc::parse(&form.card_cvc) {
        errors.insert("cardCvc", e.to_string());
    }
    require_non_empty(&mut errors, "cardName", &form.card_name, "Name on card");

    errors
}

fn require_non_empty(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    label: &str,
) {
    if value.trim().is_empty() {
        errors.insert(field, format!("{label} is required"));
    }
}

// =============================================================================
// Wizard
// =============================================================================

/// Linear checkout wizard holding the current step and form state.
#[derive(Debug, Clone, Default)]
pub struct CheckoutWizard {
    step: CheckoutStep,
    /// Accumulated form state across all steps.
    pub form: CheckoutForm,
}

impl Default for CheckoutStep {
    fn default() -> Self {
        Self::Contact
    }
}

impl CheckoutWizard {
    /// Start a fresh wizard at the contact step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Validate the current step's fields without navigating.
    #[must_use]
    pub fn validate_current(&self) -> ValidationErrors {
        match self.step {
            CheckoutStep::Contact => validate_contact(&self.form),
            CheckoutStep::Shipping => validate_shipping(&self.form),
            CheckoutStep::Payment => validate_payment(&self.form),
        }
    }

    /// Attempt a forward transition.
    ///
    /// Validates the current step first; on failure the step is unchanged
    /// and the field errors are returned. Advancing from the payment step
    /// validates it and stays (submission is a separate action).
    ///
    /// # Errors
    ///
    /// Returns the field->message map when the current step's fields are
    /// invalid.
    pub fn advance(&mut self) -> Result<CheckoutStep, ValidationErrors> {
        self.validate_current().into_result()?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Move back one step. Backward navigation is never validated.
    pub fn back(&mut self) -> CheckoutStep {
        self.step = self.step.previous();
        self.step
    }

    /// Jump back to an earlier step. Forward jumps are refused.
    pub fn back_to(&mut self, step: CheckoutStep) -> bool {
        if step <= self.step {
            self.step = step;
            true
        } else {
            false
        }
    }

    /// Build the order-creation request from the accumulated form state
    /// plus a cart snapshot.
    ///
    /// Re-validates every step so a caller cannot submit a wizard whose
    /// earlier steps were edited into an invalid state after passing.
    ///
    /// # Errors
    ///
    /// Returns the combined field->message map of all failing steps.
    pub fn build_order(
        &self,
        snapshot: &crate::pricing::CartSnapshot,
        payment_id: Option<String>,
    ) -> Result<OrderRequest, ValidationErrors> {
        let mut errors = validate_contact(&self.form);
        for (field, message) in validate_shipping(&self.form).iter() {
            errors.insert(field, message);
        }
        for (field, message) in validate_payment(&self.form).iter() {
            errors.insert(field, message);
        }
        errors.into_result()?;

        // Parses cannot fail after validation, but fall back to the raw
        // input rather than panicking if they somehow do.
        let email = Email::parse(&self.form.email)
            .map_or_else(|_| self.form.email.clone(), Email::into_inner);
        let phone = Phone::parse(&self.form.phone)
            .map_or_else(|_| self.form.phone.clone(), |p| p.as_str().to_string());
        let pincode = Pincode::parse(&self.form.pincode)
            .map_or_else(|_| self.form.pincode.clone(), |p| p.as_str().to_string());

        Ok(OrderRequest {
            items: snapshot.items.clone(),
            totals: snapshot.totals,
            customer: Customer {
                first_name: self.form.first_name.trim().to_string(),
                last_name: self.form.last_name.trim().to_string(),
                email,
                phone,
            },
            shipping_address: ShippingAddress {
                address: self.form.address.trim().to_string(),
                city: self.form.city.trim().to_string(),
                state: self.form.state.trim().to_string(),
                pincode,
            },
            payment_method: "card".to_string(),
            payment_id,
        })
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Errors from order submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form failed validation; no request was sent.
    #[error("checkout form is invalid")]
    Validation(ValidationErrors),

    /// Order creation failed; the cart is left intact for a retry.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Submit the checkout: build the order from the wizard's form and the
/// engine's current snapshot, create it, and clear the cart.
///
/// The cart is cleared only after the Pricing Service confirms the order.
/// On any failure the cart survives so the customer can retry.
///
/// # Errors
///
/// [`SubmitError::Validation`] when any step's fields are invalid;
/// [`SubmitError::Cart`] when order creation fails.
#[instrument(skip(wizard, cart), fields(session = %cart.session()))]
pub async fn submit_order<P: PricingApi>(
    wizard: &CheckoutWizard,
    cart: &CartEngine<P>,
    payment_id: Option<String>,
) -> Result<OrderConfirmation, SubmitError> {
    let snapshot = cart.snapshot();
    let request = wizard
        .build_order(&snapshot, payment_id)
        .map_err(SubmitError::Validation)?;

    let confirmation = cart.place_order(&request).await?;
    Ok(confirmation)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            card_number: "4111 1111 1111 1111".to_string(),
            card_expiry: "12/28".to_string(),
            card_cvc: "123".to_string(),
            card_name: "Asha Rao".to_string(),
        }
    }

    #[test]
    fn test_contact_step_blocks_on_bad_email_and_phone() {
        let mut wizard = CheckoutWizard::new();
        wizard.form.email = String::new();
        wizard.form.phone = "12345".to_string();

        let errors = wizard.advance().unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("phone").is_some());
        assert_eq!(wizard.step(), CheckoutStep::Contact);
    }

    #[test]
    fn test_contact_step_advances_on_valid_input() {
        let mut wizard = CheckoutWizard::new();
        wizard.form.email = "a@b.com".to_string();
        wizard.form.phone = "9876543210".to_string();

        let step = wizard.advance().unwrap();
        assert_eq!(step, CheckoutStep::Shipping);
        assert_eq!(step.number(), 2);
    }

    #[test]
    fn test_shipping_step_requires_all_fields() {
        let mut wizard = CheckoutWizard::new();
        wizard.form = valid_form();
        wizard.form.city = String::new();
        wizard.form.pincode = "12".to_string();

        wizard.advance().unwrap();
        let errors = wizard.advance().unwrap_err();

        assert!(errors.get("city").is_some());
        assert!(errors.get("pincode").is_some());
        assert!(errors.get("firstName").is_none());
        assert_eq!(wizard.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_payment_step_format_validation() {
        let mut wizard = CheckoutWizard::new();
        wizard.form = valid_form();
        wizard.form.card_number = "4111".to_string();
        wizard.form.card_cvc = "12".to_string();

        wizard.advance().unwrap();
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), CheckoutStep::Payment);

        let errors = wizard.validate_current();
        assert!(errors.get("cardNumber").is_some());
        assert!(errors.get("cardCvc").is_some());
        assert!(errors.get("cardExpiry").is_none());
    }

    #[test]
    fn test_backward_navigation_is_unrestricted() {
        let mut wizard = CheckoutWizard::new();
        wizard.form = valid_form();

        wizard.advance().unwrap();
        wizard.advance().unwrap();
        assert_eq!(wizard.step(), CheckoutStep::Payment);

        assert!(wizard.back_to(CheckoutStep::Contact));
        assert_eq!(wizard.step(), CheckoutStep::Contact);

        // Forward jumps are refused
        assert!(!wizard.back_to(CheckoutStep::Payment));
        assert_eq!(wizard.step(), CheckoutStep::Contact);
    }

    #[test]
    fn test_back_stops_at_first_step() {
        let mut wizard = CheckoutWizard::new();
        assert_eq!(wizard.back(), CheckoutStep::Contact);
    }

    #[test]
    fn test_build_order_normalizes_fields() {
        let mut wizard = CheckoutWizard::new();
        wizard.form = valid_form();
        wizard.form.phone = "98765 43210".to_string();

        let snapshot = crate::pricing::CartSnapshot::empty();
        let order = wizard
            .build_order(&snapshot, Some("pay_123".to_string()))
            .unwrap();

        assert_eq!(order.customer.phone, "9876543210");
        assert_eq!(order.shipping_address.pincode, "560001");
        assert_eq!(order.payment_method, "card");
        assert_eq!(order.payment_id.as_deref(), Some("pay_123"));
    }

    #[test]
    fn test_build_order_collects_errors_across_steps() {
        let mut wizard = CheckoutWizard::new();
        wizard.form = valid_form();
        wizard.form.email = "bad".to_string();
        wizard.form.card_number = String::new();

        let snapshot = crate::pricing::CartSnapshot::empty();
        let errors = wizard.build_order(&snapshot, None).unwrap_err();

        assert!(errors.get("email").is_some());
        assert!(errors.get("cardNumber").is_some());
        assert_eq!(errors.len(), 2);
    }
}
