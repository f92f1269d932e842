//! End-to-end checkout: wizard validation, order submission, and the
//! cart-clearing contract (clear only after the order is confirmed).

use meridian_core::{ItemId, ItemType, SessionId};
use meridian_storefront::cart::CartEngine;
use meridian_storefront::checkout::{CheckoutForm, CheckoutStep, CheckoutWizard, SubmitError, submit_order};
use meridian_storefront::pricing::CartTotals;

use meridian_integration_tests::{FakePricingService, init_tracing};

fn filled_form() -> CheckoutForm {
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

async fn cart_with_items(service: &FakePricingService) -> CartEngine<&FakePricingService> {
    let cart = CartEngine::new(service, SessionId::generate());
    cart.add_item(ItemId::new("PART-PAD"), ItemType::Part, 2)
        .await
        .expect("add brake pads");
    cart.add_item(ItemId::new("PART-BAT"), ItemType::Part, 1)
        .await
        .expect("add battery");
    cart
}

// =============================================================================
// Wizard Navigation
// =============================================================================

#[tokio::test]
async fn test_invalid_contact_blocks_progress_with_both_errors() {
    init_tracing();
    let mut wizard = CheckoutWizard::new();
    wizard.form.email = String::new();
    wizard.form.phone = "12345".to_string();

    let errors = wizard.advance().expect_err("contact step must block");
    assert!(errors.get("email").is_some());
    assert!(errors.get("phone").is_some());
    assert_eq!(wizard.step().number(), 1);
}

#[tokio::test]
async fn test_walkthrough_reaches_payment_step() {
    init_tracing();
    let mut wizard = CheckoutWizard::new();
    wizard.form = filled_form();

    assert_eq!(wizard.advance().expect("contact"), CheckoutStep::Shipping);
    assert_eq!(wizard.advance().expect("shipping"), CheckoutStep::Payment);
    // Advancing from payment validates and stays
    assert_eq!(wizard.advance().expect("payment"), CheckoutStep::Payment);
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_confirmed_order_clears_the_cart() {
    init_tracing();
    let service = FakePricingService::seeded();
    let cart = cart_with_items(&service).await;
    let expected_total = cart.totals().total;

    let mut wizard = CheckoutWizard::new();
    wizard.form = filled_form();

    let confirmation = submit_order(&wizard, &cart, Some("pay_001".to_string()))
        .await
        .expect("order should be confirmed");

    assert!(confirmation.order_id.as_str().starts_with("ORD_"));
    assert_eq!(confirmation.status.as_deref(), Some("confirmed"));
    assert!(expected_total > 0);

    // Cleared locally and server-side
    assert!(cart.items().is_empty());
    assert_eq!(cart.totals(), CartTotals::zero());
    cart.fetch().await.expect("re-fetch");
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn test_failed_order_leaves_cart_for_retry() {
    init_tracing();
    let service = FakePricingService::seeded();
    let cart = cart_with_items(&service).await;
    let before = cart.snapshot();

    let mut wizard = CheckoutWizard::new();
    wizard.form = filled_form();

    service.set_orders_fail(true);
    let err = submit_order(&wizard, &cart, None)
        .await
        .expect_err("order creation fails");
    assert!(matches!(err, SubmitError::Cart(_)));
    assert_eq!(cart.snapshot(), before, "cart must survive a failed order");

    // The same cart submits fine once the service recovers
    service.set_orders_fail(false);
    submit_order(&wizard, &cart, None)
        .await
        .expect("retry succeeds");
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn test_invalid_form_never_reaches_the_service() {
    init_tracing();
    let service = FakePricingService::seeded();
    let cart = cart_with_items(&service).await;
    let before = cart.snapshot();

    let mut wizard = CheckoutWizard::new();
    wizard.form = filled_form();
    wizard.form.card_number = "4111".to_string();

    let err = submit_order(&wizard, &cart, None)
        .await
        .expect_err("validation must block submission");
    match err {
        SubmitError::Validation(errors) => assert!(errors.get("cardNumber").is_some()),
        SubmitError::Cart(e) => panic!("expected a validation error, got {e}"),
    }
    assert_eq!(cart.snapshot(), before);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    init_tracing();
    let service = FakePricingService::seeded();
    let cart = CartEngine::new(&service, SessionId::generate());
    cart.fetch().await.expect("fetch empty cart");

    let mut wizard = CheckoutWizard::new();
    wizard.form = filled_form();

    let err = submit_order(&wizard, &cart, None)
        .await
        .expect_err("empty cart is rejected");
    assert!(matches!(err, SubmitError::Cart(_)));
}

#[tokio::test]
async fn test_order_carries_normalized_customer_fields() {
    init_tracing();
    let service = FakePricingService::seeded();
    let cart = cart_with_items(&service).await;

    let mut wizard = CheckoutWizard::new();
    wizard.form = filled_form();
    wizard.form.phone = "98765 43210".to_string();
    wizard.form.first_name = "  Asha ".to_string();

    let order = wizard
        .build_order(&cart.snapshot(), Some("pay_002".to_string()))
        .expect("valid form builds an order");

    assert_eq!(order.customer.phone, "9876543210");
    assert_eq!(order.customer.first_name, "Asha");
    assert_eq!(order.totals, cart.totals());
    assert_eq!(order.items.len(), cart.items().len());
}
