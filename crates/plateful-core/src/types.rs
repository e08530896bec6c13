//! # Domain Types
//!
//! Core domain types used throughout Plateful.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cart       │   │   FeeSchedule   │   │ PriceBreakdown  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  items          │──►│  tax_percent    │──►│  items_subtotal │       │
//! │  │  discount_%     │   │  platform_fee_% │   │  tax, tip, fees │       │
//! │  │  tip_cents      │   │  processing     │   │  gross_total    │       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │                                                             │
//! │  ┌────────▼────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartItem     │   │   ReceiptLine   │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  unit_price     │   │  kind, label    │   │  cart snapshot  │       │
//! │  │  quantity       │   │  amount × qty   │   │  breakdown      │       │
//! │  │  modifiers[]    │   └─────────────────┘   │  payment_status │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An [`Order`] stores the cart, the fee schedule, and the breakdown exactly
//! as priced. Displaying an order never reprices it, so the dashboard always
//! matches what the customer was charged even after fee defaults change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, PricingResult};
use crate::money::Money;

// =============================================================================
// Cart
// =============================================================================

/// An add-on priced per unit of its parent item (extra cheese, large size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Modifier {
    pub name: String,
    /// Price in cents added to each unit of the parent item.
    pub unit_price_cents: i64,
}

impl Modifier {
    pub fn new(name: impl Into<String>, unit_price_cents: i64) -> Self {
        Modifier {
            name: name.into(),
            unit_price_cents,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// A line of the order form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Display name shown on the receipt.
    pub name: String,

    /// Base price in cents, before modifiers.
    pub unit_price_cents: i64,

    /// Quantity ordered. Zero is kept and priced at zero.
    pub quantity: i64,

    /// Add-ons, in the order they were chosen.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    /// Kitchen prep notes ("no onions").
    #[serde(default)]
    pub notes: Option<String>,
}

impl CartItem {
    /// Creates an item without modifiers or notes.
    pub fn new(name: impl Into<String>, unit_price_cents: i64, quantity: i64) -> Self {
        CartItem {
            name: name.into(),
            unit_price_cents,
            quantity,
            modifiers: Vec::new(),
            notes: None,
        }
    }

    /// Adds a modifier (builder style, mostly for tests and fixtures).
    pub fn with_modifier(mut self, name: impl Into<String>, unit_price_cents: i64) -> Self {
        self.modifiers.push(Modifier::new(name, unit_price_cents));
        self
    }

    /// Sets prep notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Own unit price plus every modifier's unit price.
    ///
    /// ## Example
    /// ```rust
    /// use plateful_core::CartItem;
    ///
    /// let burger = CartItem::new("Burger", 1000, 2)
    ///     .with_modifier("Cheese", 150)
    ///     .with_modifier("Bacon", 200);
    /// assert_eq!(burger.effective_unit_price().unwrap().cents(), 1350);
    /// assert_eq!(burger.line_total().unwrap().cents(), 2700);
    /// ```
    pub fn effective_unit_price(&self) -> PricingResult<Money> {
        self.modifiers
            .iter()
            .try_fold(self.unit_price(), |acc, m| acc.checked_add(m.unit_price()))
    }

    /// Effective unit price × quantity.
    pub fn line_total(&self) -> PricingResult<Money> {
        self.effective_unit_price()?.checked_mul(self.quantity)
    }
}

/// One checkout attempt's worth of input to the pricing engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,

    /// Percentage off the items subtotal, in `[0, 100]`.
    #[serde(default)]
    pub discount_percent: f64,

    /// Tip in cents.
    #[serde(default)]
    pub tip_cents: i64,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Cart {
            items,
            discount_percent: 0.0,
            tip_cents: 0,
        }
    }

    pub fn with_discount_percent(mut self, percent: f64) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn with_tip_cents(mut self, tip_cents: i64) -> Self {
        self.tip_cents = tip_cents;
        self
    }

    #[inline]
    pub fn tip(&self) -> Money {
        Money::from_cents(self.tip_cents)
    }

    /// Checks if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Fee Schedule
// =============================================================================

/// Tax, platform fee, card processing and tip-skim configuration.
///
/// Passed into every pricing call; there is no process-wide fee constant.
/// The [`Default`] values are the reference deployment's.
///
/// ## Units
/// - `*_percent`: percentage values (9.5 = 9.5%)
/// - `processing_rate`: fraction of the gross charge (0.029 = 2.9%)
/// - `*_cents`: minor units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeSchedule {
    /// Flat sales-tax rate on the discounted subtotal.
    pub tax_percent: f64,

    /// Platform fee on the discounted, pre-tax subtotal.
    pub platform_fee_percent: f64,

    /// Hard ceiling on the platform fee. `None` means uncapped.
    pub platform_fee_cap_cents: Option<i64>,

    /// Card processor's percentage, as a fraction in `[0, 1)`.
    pub processing_rate: f64,

    /// Card processor's fixed per-charge fee.
    pub processing_fixed_cents: i64,

    /// Tips at or above this amount are skimmed.
    pub tip_skim_threshold_cents: i64,

    /// Most the platform takes from a single tip.
    pub tip_skim_cap_cents: i64,
}

impl Default for FeeSchedule {
    /// Reference values: 9.5% tax, 7.5% platform fee capped at $9.95,
    /// 2.9% + $0.30 processing, up to $1.00 skimmed from tips of $1.00 or more.
    fn default() -> Self {
        FeeSchedule {
            tax_percent: 9.5,
            platform_fee_percent: 7.5,
            platform_fee_cap_cents: Some(995),
            processing_rate: 0.029,
            processing_fixed_cents: 30,
            tip_skim_threshold_cents: 100,
            tip_skim_cap_cents: 100,
        }
    }
}

impl FeeSchedule {
    /// A schedule that charges nothing beyond the goods themselves.
    pub fn zero() -> Self {
        FeeSchedule {
            tax_percent: 0.0,
            platform_fee_percent: 0.0,
            platform_fee_cap_cents: None,
            processing_rate: 0.0,
            processing_fixed_cents: 0,
            tip_skim_threshold_cents: 0,
            tip_skim_cap_cents: 0,
        }
    }

    /// Checks every field without pricing anything.
    ///
    /// Used at configuration load time so a bad deployment fails at startup
    /// instead of on the first order.
    pub fn validate(&self) -> PricingResult<()> {
        crate::pricing::resolve_fee_schedule(self).map(|_| ())
    }
}

// =============================================================================
// Pricing Output
// =============================================================================

/// Itemized result of pricing one cart. All amounts in cents.
///
/// ## Invariants
/// ```text
/// gross_total     == taxable_amount + tax + tip + platform_fee + processing_fee
/// application_fee == platform_fee + tip_skim
/// seller_net      == taxable_amount + tax + (tip − tip_skim)
///                 == gross_total − processing_fee − application_fee
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub items_subtotal_cents: i64,
    pub discount_cents: i64,
    pub taxable_cents: i64,
    pub tax_cents: i64,
    pub tip_cents: i64,
    /// Part of the tip kept by the platform.
    pub tip_skim_cents: i64,
    pub platform_fee_cents: i64,
    /// Visible processing line, including any rounding surplus of the gross-up.
    pub processing_fee_cents: i64,
    /// Routed to the platform account: platform fee + tip skim.
    pub application_fee_cents: i64,
    /// What the seller receives after the processor and the platform take their share.
    pub seller_net_cents: i64,
    /// What the customer is charged.
    pub gross_total_cents: i64,
}

impl PriceBreakdown {
    #[inline]
    pub fn gross_total(&self) -> Money {
        Money::from_cents(self.gross_total_cents)
    }

    #[inline]
    pub fn application_fee(&self) -> Money {
        Money::from_cents(self.application_fee_cents)
    }

    #[inline]
    pub fn seller_net(&self) -> Money {
        Money::from_cents(self.seller_net_cents)
    }

    #[inline]
    pub fn taxable(&self) -> Money {
        Money::from_cents(self.taxable_cents)
    }
}

/// What a receipt line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptLineKind {
    Item,
    Discount,
    Tax,
    Tip,
    PlatformFee,
    ProcessingFee,
}

/// One itemized entry shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub kind: ReceiptLineKind,
    pub label: String,
    /// Per-unit amount; negative only for the discount line.
    pub amount_cents: i64,
    pub quantity: i64,
}

impl ReceiptLine {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// amount × quantity, failing with [`PricingError::Overflow`](crate::PricingError::Overflow) instead of wrapping.
    pub fn total(&self) -> PricingResult<Money> {
        self.amount().checked_mul(self.quantity)
    }
}

// =============================================================================
// Order Record
// =============================================================================

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    #[default]
    Pickup,
    Delivery,
}

/// Where a delivery order goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryAddress {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// The person the order is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    /// Only meaningful for delivery orders.
    #[serde(default)]
    pub address: Option<DeliveryAddress>,
}

/// Payment state of an order.
///
/// ## Lifecycle
/// ```text
///   Pending ─────────┐
///      │             │
///      ▼             ▼
///   RequiresPayment ─┼──► Paid ──► Refunded
///      ▲             │
///      │             ├──► Failed ──► RequiresPayment (new link)
///      └─────────────┘
///                    └──► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Saved without a checkout link.
    #[default]
    Pending,
    /// Checkout link sent, waiting on the customer.
    RequiresPayment,
    Paid,
    Failed,
    Canceled,
    Refunded,
}

impl PaymentStatus {
    /// Stable lowercase name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::RequiresPayment => "requires_payment",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, RequiresPayment)
                | (Pending, Paid)
                | (Pending, Failed)
                | (Pending, Canceled)
                | (RequiresPayment, Paid)
                | (RequiresPayment, Failed)
                | (RequiresPayment, Canceled)
                | (Failed, RequiresPayment)
                | (Failed, Canceled)
                | (Paid, Refunded)
        )
    }

    /// No further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Canceled | PaymentStatus::Refunded)
    }

    /// Returns `next` if the transition is allowed.
    pub fn transition_to(self, order_id: &str, next: PaymentStatus) -> CoreResult<PaymentStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "requires_payment" => Ok(PaymentStatus::RequiresPayment),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "canceled" | "cancelled" => Ok(PaymentStatus::Canceled),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

/// A persisted order: who, what, and exactly how it was priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable number: `YYYYMMDD-NNNN`.
    pub order_number: String,

    pub restaurant_id: String,
    pub customer: Customer,
    pub fulfillment: FulfillmentType,
    pub notes: Option<String>,

    /// Cart as priced (frozen).
    pub cart: Cart,

    /// Fee schedule as priced (frozen).
    pub fees: FeeSchedule,

    pub breakdown: PriceBreakdown,
    pub receipt_lines: Vec<ReceiptLine>,

    pub payment_status: PaymentStatus,

    /// Provider-side identifier of the hosted checkout link.
    pub checkout_link_id: Option<String>,
    pub checkout_url: Option<String>,

    /// Hidden orders are kept out of the dashboard (saved drafts).
    pub is_visible: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn gross_total(&self) -> Money {
        self.breakdown.gross_total()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_unit_price_includes_modifiers() {
        let item = CartItem::new("Pho", 1400, 3)
            .with_modifier("Extra brisket", 300)
            .with_modifier("Large", 200);
        assert_eq!(item.effective_unit_price().unwrap().cents(), 1900);
        assert_eq!(item.line_total().unwrap().cents(), 5700);
    }

    #[test]
    fn test_zero_quantity_line_total() {
        let item = CartItem::new("Soda", 250, 0).with_modifier("Ice", 0);
        assert_eq!(item.line_total().unwrap().cents(), 0);
    }

    #[test]
    fn test_receipt_line_total_is_checked() {
        let line = ReceiptLine {
            kind: ReceiptLineKind::Item,
            label: "Pho".to_string(),
            amount_cents: 1900,
            quantity: 3,
        };
        assert_eq!(line.total().unwrap().cents(), 5700);

        let line = ReceiptLine { amount_cents: i64::MAX, quantity: 2, ..line };
        assert!(matches!(line.total(), Err(crate::error::PricingError::Overflow)));
    }

    #[test]
    fn test_cart_deserializes_with_defaults() {
        let json = r#"{ "items": [ { "name": "Tacos", "unit_price_cents": 450, "quantity": 2 } ] }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert!(cart.items[0].modifiers.is_empty());
        assert_eq!(cart.discount_percent, 0.0);
        assert_eq!(cart.tip_cents, 0);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_fee_schedule_default_matches_reference_values() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.platform_fee_cap_cents, Some(995));
        assert_eq!(fees.tip_skim_threshold_cents, 100);
        assert_eq!(fees.tip_skim_cap_cents, 100);
        assert!(fees.validate().is_ok());
        assert!(FeeSchedule::zero().validate().is_ok());
    }

    #[test]
    fn test_payment_status_transitions() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(RequiresPayment));
        assert!(RequiresPayment.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Refunded));
        assert!(Failed.can_transition_to(RequiresPayment));

        assert!(!Paid.can_transition_to(Pending));
        assert!(!Refunded.can_transition_to(Paid));
        assert!(!Canceled.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Refunded));

        assert!(Canceled.is_terminal());
        assert!(!Paid.is_terminal());
    }

    #[test]
    fn test_payment_status_transition_error() {
        let err = PaymentStatus::Refunded
            .transition_to("order-1", PaymentStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));

        let next = PaymentStatus::RequiresPayment
            .transition_to("order-1", PaymentStatus::Paid)
            .unwrap();
        assert_eq!(next, PaymentStatus::Paid);
    }

    #[test]
    fn test_payment_status_round_trips_through_str() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::RequiresPayment,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Canceled,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert_eq!("Cancelled".parse::<PaymentStatus>().unwrap(), PaymentStatus::Canceled);
        assert!("shipped".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentStatus::RequiresPayment).unwrap();
        assert_eq!(json, "\"requires_payment\"");
        let json = serde_json::to_string(&FulfillmentType::Delivery).unwrap();
        assert_eq!(json, "\"delivery\"");
    }
}
