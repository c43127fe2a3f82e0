//! Realistic Stripe webhook bodies for tests.
//!
//! `stripe_webhook` decodes the full event object, so these carry every
//! field Stripe sends for a Checkout Session rather than only the ones the
//! reconciler reads.

use serde_json::{Value, json};

/// A `checkout.session` object in the `complete` state.
#[must_use]
pub fn checkout_session(id: &str, payment_intent: Option<&str>, metadata: &Value) -> Value {
    json!({
        "id": id,
        "object": "checkout.session",
        "adaptive_pricing": { "enabled": false },
        "after_expiration": null,
        "allow_promotion_codes": null,
        "amount_subtotal": 1000,
        "amount_total": 1000,
        "automatic_tax": { "enabled": false, "liability": null, "provider": null, "status": null },
        "billing_address_collection": null,
        "cancel_url": "https://aceback.app/stickers/cancel",
        "client_reference_id": null,
        "client_secret": null,
        "collected_information": null,
        "consent": null,
        "consent_collection": null,
        "created": 1_700_000_000,
        "currency": "usd",
        "currency_conversion": null,
        "custom_fields": [],
        "custom_text": {
            "after_submit": null,
            "shipping_address": null,
            "submit": null,
            "terms_of_service_acceptance": null
        },
        "customer": null,
        "customer_creation": "if_required",
        "customer_details": {
            "address": null,
            "email": "thrower@example.com",
            "name": null,
            "phone": null,
            "tax_exempt": "none",
            "tax_ids": []
        },
        "customer_email": "thrower@example.com",
        "discounts": [],
        "expires_at": 1_700_086_400,
        "invoice": null,
        "invoice_creation": null,
        "livemode": false,
        "locale": null,
        "metadata": metadata,
        "mode": "payment",
        "payment_intent": payment_intent,
        "payment_link": null,
        "payment_method_collection": "if_required",
        "payment_method_configuration_details": null,
        "payment_method_options": {},
        "payment_method_types": ["card"],
        "payment_status": "paid",
        "phone_number_collection": { "enabled": false },
        "recovered_from": null,
        "saved_payment_method_options": null,
        "setup_intent": null,
        "shipping_address_collection": null,
        "shipping_cost": null,
        "shipping_details": null,
        "shipping_options": [],
        "status": "complete",
        "submit_type": null,
        "subscription": null,
        "success_url": "https://aceback.app/stickers/success",
        "total_details": { "amount_discount": 0, "amount_shipping": 0, "amount_tax": 0 },
        "ui_mode": "hosted",
        "url": null
    })
}

/// An event envelope of `event_type` wrapping `object`.
#[must_use]
pub fn event(id: &str, event_type: &str, object: &Value) -> String {
    json!({
        "id": id,
        "object": "event",
        "api_version": "2024-06-20",
        "created": 1_700_000_000,
        "data": { "object": object },
        "livemode": false,
        "pending_webhooks": 1,
        "request": { "id": null, "idempotency_key": null },
        "type": event_type
    })
    .to_string()
}
