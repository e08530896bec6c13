//! # Checkout Links
//!
//! The boundary to the hosted-checkout payment provider.
//!
//! ## What Crosses the Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PriceQuote                        CheckoutRequest                      │
//! │  ──────────                        ───────────────                      │
//! │  item lines        ─┐                                                   │
//! │  discount line     ─┴─ discount? ──► "Subtotal" (taxable), qty 1        │
//! │                        no discount ► item lines as-is                   │
//! │  tax, tip, service fee, processing ► one line each                      │
//! │  application_fee   ───────────────► application_fee (platform share)    │
//! │                                                                         │
//! │  Σ unit_amount × quantity == gross_total                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Hosted checkout pages reject negative unit amounts, which is why a
//! discounted cart is sent as a single subtotal line.

use async_trait::async_trait;
use plateful_core::receipt::service_fee_note;
use plateful_core::{PriceQuote, PricingError, ReceiptLineKind, CURRENCY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One visible line on the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    /// Cents, never negative.
    pub unit_amount: i64,
    pub quantity: i64,
}

/// A request for a hosted checkout link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    /// Cents routed to the platform account.
    pub application_fee: i64,
    /// Shown next to the pay button.
    pub submit_note: String,
    /// Where the customer lands after paying.
    pub redirect_url: Option<String>,
    /// Connected account the charge is made on.
    pub seller_account_id: String,
}

impl CheckoutRequest {
    /// Builds the request for a priced quote.
    pub fn from_quote(
        quote: &PriceQuote,
        seller_account_id: impl Into<String>,
        redirect_url: Option<&str>,
    ) -> Self {
        let has_discount = quote
            .receipt_lines
            .iter()
            .any(|line| line.kind == ReceiptLineKind::Discount);

        let mut line_items = Vec::with_capacity(quote.receipt_lines.len());

        if has_discount && quote.breakdown.taxable_cents > 0 {
            line_items.push(CheckoutLineItem {
                name: "Subtotal".to_string(),
                unit_amount: quote.breakdown.taxable_cents,
                quantity: 1,
            });
        }

        for line in &quote.receipt_lines {
            let collapsed = has_discount
                && matches!(line.kind, ReceiptLineKind::Item | ReceiptLineKind::Discount);
            if collapsed || line.quantity == 0 {
                continue;
            }
            line_items.push(CheckoutLineItem {
                name: line.label.clone(),
                unit_amount: line.amount_cents,
                quantity: line.quantity,
            });
        }

        CheckoutRequest {
            currency: CURRENCY.to_string(),
            line_items,
            application_fee: quote.breakdown.application_fee_cents,
            submit_note: service_fee_note(quote),
            redirect_url: redirect_url.map(str::to_string),
            seller_account_id: seller_account_id.into(),
        }
    }

    /// Σ unit_amount × quantity, failing with [`PricingError::Overflow`] instead of wrapping.
    pub fn total(&self) -> Result<i64, PricingError> {
        self.line_items.iter().try_fold(0i64, |acc, item| {
            item.unit_amount
                .checked_mul(item.quantity)
                .and_then(|line| acc.checked_add(line))
                .ok_or(PricingError::Overflow)
        })
    }
}

/// A created hosted checkout link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLink {
    /// Provider-side id, stored on the order.
    pub id: String,
    pub url: String,
}

/// Checkout provider failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The provider refused the request (bad account, amount limits).
    #[error("Checkout provider rejected the request: {0}")]
    Rejected(String),

    /// The provider could not be reached or timed out.
    #[error("Checkout provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something we could not use.
    #[error("Unexpected checkout provider response: {0}")]
    InvalidResponse(String),
}

/// Creates hosted checkout links.
///
/// Implementations talk to the payment provider. The order service calls
/// `create_link` at most once per submission and never retries.
#[async_trait]
pub trait CheckoutLinkProvider: Send + Sync {
    async fn create_link(&self, request: &CheckoutRequest) -> Result<CheckoutLink, CheckoutError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateful_core::{price, Cart, CartItem, FeeSchedule};

    fn quote(cart: &Cart) -> PriceQuote {
        price(cart, &FeeSchedule::default()).unwrap()
    }

    #[test]
    fn test_request_mirrors_receipt_without_discount() {
        let cart = Cart::new(vec![
            CartItem::new("Burger", 1000, 2).with_modifier("Cheese", 150),
            CartItem::new("Soda", 250, 0),
        ])
        .with_tip_cents(500);
        let quote = quote(&cart);
        let request = CheckoutRequest::from_quote(&quote, "acct_123", Some("https://order.example.com"));

        let names: Vec<&str> = request.line_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Burger (Cheese)",
                "Tax (9.5%)",
                "Tip",
                "Service fee (7.5%) incl. $1.00 from tip",
                "Processing fee (2.9% + $0.30)",
            ]
        );
        assert_eq!(request.line_items[0].quantity, 2);
        assert_eq!(request.total().unwrap(), quote.breakdown.gross_total_cents);
        assert_eq!(request.application_fee, quote.breakdown.application_fee_cents);
        assert_eq!(request.currency, "usd");
        assert_eq!(request.redirect_url.as_deref(), Some("https://order.example.com"));
        assert_eq!(request.seller_account_id, "acct_123");
    }

    #[test]
    fn test_discount_collapses_into_subtotal() {
        let cart = Cart::new(vec![
            CartItem::new("Ramen", 1450, 2),
            CartItem::new("Gyoza", 800, 1),
        ])
        .with_discount_percent(15.0);
        let quote = quote(&cart);
        let request = CheckoutRequest::from_quote(&quote, "acct_123", None);

        assert_eq!(request.line_items[0].name, "Subtotal");
        assert_eq!(request.line_items[0].unit_amount, quote.breakdown.taxable_cents);
        assert!(request.line_items.iter().all(|i| i.unit_amount >= 0));
        assert_eq!(request.total().unwrap(), quote.breakdown.gross_total_cents);
    }

    #[test]
    fn test_submit_note() {
        let quote = quote(&Cart::new(vec![CartItem::new("Burger", 1000, 2)]));
        let request = CheckoutRequest::from_quote(&quote, "acct_123", None);
        assert_eq!(request.submit_note, "Includes service fee $1.50 (7.5%).");
    }

    #[test]
    fn test_totals_reconcile_over_grid() {
        for discount in [0.0, 10.0, 50.0, 100.0] {
            for tip in [0, 99, 100, 750] {
                let cart = Cart::new(vec![
                    CartItem::new("A", 1299, 3).with_modifier("x", 50),
                    CartItem::new("B", 0, 1),
                ])
                .with_discount_percent(discount)
                .with_tip_cents(tip);
                let quote = quote(&cart);
                let request = CheckoutRequest::from_quote(&quote, "acct", None);
                assert_eq!(request.total().unwrap(), quote.breakdown.gross_total_cents);
            }
        }
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let request = CheckoutRequest {
            currency: CURRENCY.to_string(),
            line_items: vec![
                CheckoutLineItem { name: "Catering".to_string(), unit_amount: i64::MAX / 2, quantity: 3 },
            ],
            application_fee: 0,
            submit_note: String::new(),
            redirect_url: None,
            seller_account_id: "acct".to_string(),
        };
        assert!(matches!(request.total(), Err(PricingError::Overflow)));

        let request = CheckoutRequest {
            line_items: vec![
                CheckoutLineItem { name: "A".to_string(), unit_amount: i64::MAX, quantity: 1 },
                CheckoutLineItem { name: "B".to_string(), unit_amount: 1, quantity: 1 },
            ],
            ..request
        };
        assert!(matches!(request.total(), Err(PricingError::Overflow)));
    }
}
