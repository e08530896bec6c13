//! # Order Service
//!
//! Orchestrates a submission: validate, price, create the checkout link,
//! persist.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_with_checkout(submission)                                       │
//! │       │                                                                 │
//! │       ├── validate_order_details ──── error ──► nothing sent or saved   │
//! │       ├── price + ensure_chargeable ─ error ──► nothing sent or saved   │
//! │       │                                                                 │
//! │       ├── CheckoutLinkProvider::create_link (exactly once)              │
//! │       │        └── error ──► nothing saved                              │
//! │       │                                                                 │
//! │       └── OrderRepository::insert (RequiresPayment, visible)            │
//! │                └── error ──► link logged with warn!, Storage returned   │
//! │                                                                         │
//! │  save_order(submission)           → Pending, hidden, no link            │
//! │  send_checkout_link(order_id)     → link for the stored snapshot        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A saved order is never repriced. `send_checkout_link` builds the checkout
//! request from the stored breakdown and receipt lines; the stored cart and
//! fee schedule only supply the rate labels.

use plateful_core::validation::{validate_order_details, validate_uuid};
use plateful_core::{
    applied_rates, ensure_chargeable, price, Cart, Customer, FulfillmentType, Order,
    PaymentStatus, PriceQuote,
};
use plateful_db::{Database, NewOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::checkout::{CheckoutLink, CheckoutLinkProvider, CheckoutRequest};
use crate::config::OrderingConfig;
use crate::error::{OrderError, OrderResult};

/// What the order form sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub customer: Customer,
    #[serde(default)]
    pub fulfillment: FulfillmentType,
    #[serde(default)]
    pub notes: Option<String>,
    pub cart: Cart,
}

/// A stored order together with the link the customer pays through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedOrder {
    pub order: Order,
    pub checkout: CheckoutLink,
}

/// The order submission flow for one restaurant.
pub struct OrderService<P: CheckoutLinkProvider> {
    db: Database,
    provider: P,
    config: OrderingConfig,
}

impl<P: CheckoutLinkProvider> OrderService<P> {
    pub fn new(db: Database, provider: P, config: OrderingConfig) -> Self {
        OrderService {
            db,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Prices a cart with the configured fee schedule. No side effects.
    pub fn quote(&self, cart: &Cart) -> OrderResult<PriceQuote> {
        Ok(price(cart, &self.config.fees)?)
    }

    /// Validates, prices, creates a checkout link and stores the order.
    pub async fn submit_with_checkout(
        &self,
        submission: OrderSubmission,
    ) -> OrderResult<SubmittedOrder> {
        let quote = self.prepare(&submission)?;
        let request = self.checkout_request(&quote);

        debug!(
            gross_total_cents = quote.breakdown.gross_total_cents,
            application_fee_cents = quote.breakdown.application_fee_cents,
            "Requesting checkout link"
        );
        let link = self.provider.create_link(&request).await?;

        let new = self.new_order(
            submission,
            quote,
            PaymentStatus::RequiresPayment,
            Some(&link),
        );

        let order = match self.db.orders().insert(new).await {
            Ok(order) => order,
            Err(e) => {
                // The customer may already have the link; keep enough to reconcile by hand.
                warn!(
                    link_id = %link.id,
                    url = %link.url,
                    error = %e,
                    "Checkout link created but order was not stored"
                );
                return Err(e.into());
            }
        };

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            gross_total_cents = order.breakdown.gross_total_cents,
            "Order submitted with checkout link"
        );

        Ok(SubmittedOrder {
            order,
            checkout: link,
        })
    }

    /// Validates, prices and stores the order without a checkout link.
    ///
    /// The order is Pending and hidden from the dashboard until a link is sent.
    pub async fn save_order(&self, submission: OrderSubmission) -> OrderResult<Order> {
        let quote = self.prepare(&submission)?;
        let new = self.new_order(submission, quote, PaymentStatus::Pending, None);
        let order = self.db.orders().insert(new).await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            "Order saved without checkout link"
        );

        Ok(order)
    }

    /// Creates a checkout link for a stored order and attaches it.
    ///
    /// The charge is exactly the stored snapshot, even if pricing rules changed
    /// since the order was saved.
    pub async fn send_checkout_link(&self, order_id: &str) -> OrderResult<SubmittedOrder> {
        validate_uuid(order_id)?;

        let stored = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        // Checked before the provider is called.
        stored
            .payment_status
            .transition_to(order_id, PaymentStatus::RequiresPayment)?;

        let quote = PriceQuote {
            rates: applied_rates(&stored.cart, &stored.fees)?,
            breakdown: stored.breakdown,
            receipt_lines: stored.receipt_lines,
        };
        ensure_chargeable(&quote)?;

        let link = self
            .provider
            .create_link(&self.checkout_request(&quote))
            .await?;

        let order = match self
            .db
            .orders()
            .attach_checkout_link(order_id, &link.id, &link.url)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                warn!(
                    order_id = %order_id,
                    link_id = %link.id,
                    url = %link.url,
                    error = %e,
                    "Checkout link created but not attached"
                );
                return Err(e.into());
            }
        };

        info!(order_id = %order.id, order_number = %order.order_number, "Checkout link sent");

        Ok(SubmittedOrder {
            order,
            checkout: link,
        })
    }

    /// Records a payment outcome reported for a checkout link.
    pub async fn record_payment_status(
        &self,
        checkout_link_id: &str,
        status: PaymentStatus,
    ) -> OrderResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_checkout_link(checkout_link_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(checkout_link_id.to_string()))?;

        if order.payment_status == status {
            debug!(order_id = %order.id, status = %status, "Payment status unchanged");
            return Ok(order);
        }

        let order = self.db.orders().update_payment_status(&order.id, status).await?;
        info!(order_id = %order.id, status = %status, "Payment status recorded");
        Ok(order)
    }

    /// Most recent visible orders, newest first.
    pub async fn dashboard(&self, limit: i64) -> OrderResult<Vec<Order>> {
        Ok(self.db.orders().list_recent(limit, false).await?)
    }

    // ===== Helpers =====

    fn prepare(&self, submission: &OrderSubmission) -> OrderResult<PriceQuote> {
        validate_order_details(
            &submission.customer,
            submission.fulfillment,
            submission.notes.as_deref(),
            &submission.cart,
        )?;

        let quote = price(&submission.cart, &self.config.fees)?;
        ensure_chargeable(&quote)?;
        Ok(quote)
    }

    fn checkout_request(&self, quote: &PriceQuote) -> CheckoutRequest {
        CheckoutRequest::from_quote(
            quote,
            self.config.seller_account_id.clone(),
            self.config.base_url.as_deref(),
        )
    }

    fn new_order(
        &self,
        submission: OrderSubmission,
        quote: PriceQuote,
        payment_status: PaymentStatus,
        link: Option<&CheckoutLink>,
    ) -> NewOrder {
        NewOrder {
            restaurant_id: self.config.restaurant_id.clone(),
            customer: submission.customer,
            fulfillment: submission.fulfillment,
            notes: submission.notes,
            cart: submission.cart,
            fees: self.config.fees.clone(),
            breakdown: quote.breakdown,
            receipt_lines: quote.receipt_lines,
            payment_status,
            checkout_link_id: link.map(|l| l.id.clone()),
            checkout_url: link.map(|l| l.url.clone()),
            is_visible: link.is_some(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
