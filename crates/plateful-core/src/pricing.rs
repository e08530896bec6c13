//! # Pricing Engine
//!
//! Turns a [`Cart`] and a [`FeeSchedule`] into a [`PriceBreakdown`] plus the
//! receipt lines a hosted checkout page will show.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate schedule, discount, tip, every line  (nothing computed yet)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  items_subtotal = Σ (unit + modifiers) × qty                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount  = subtotal × discount%             (Round)                  │
//! │  taxable   = max(subtotal − discount, 0)                               │
//! │  tax       = taxable × tax%                   (Round)                  │
//! │  platform  = min(taxable × platform%, cap)    (Ceil)                   │
//! │  tip_skim  = tip ≥ threshold ? min(cap, tip) : 0                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  application_fee = platform + tip_skim        → platform account       │
//! │  seller_net      = taxable + tax + tip − skim → seller account         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gross = ⌈(seller_net + application_fee + fixed) / (1 − rate)⌉         │
//! │  processing_fee = gross − seller_net − application_fee                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Gross-Up?
//! The processor takes its percentage from the *total charged*, including
//! the processing line itself. Adding `2.9% + $0.30` of the subtotal leaves
//! the seller short. Solving for the gross charge and rounding up means the
//! seller and the platform always receive their exact amounts; any surplus
//! cent lands in the visible processing fee.
//!
//! ## Example
//! ```rust
//! use plateful_core::{price, Cart, CartItem, FeeSchedule};
//!
//! let cart = Cart::new(vec![CartItem::new("Burger", 1000, 2)]);
//! let quote = price(&cart, &FeeSchedule::default()).unwrap();
//!
//! assert_eq!(quote.breakdown.tax_cents, 190);
//! assert_eq!(quote.breakdown.platform_fee_cents, 150);
//! assert_eq!(quote.breakdown.gross_total_cents, 2441);
//! assert_eq!(quote.breakdown.processing_fee_cents, 101);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{PricingError, PricingResult};
use crate::money::{
    apply_percent, cap_at, div_rounded, money_from_i128, Money, Rate, Rounding,
};
use crate::receipt;
use crate::types::{Cart, CartItem, FeeSchedule, PriceBreakdown, ReceiptLine};

// =============================================================================
// Output
// =============================================================================

/// The rates a quote was priced with, kept for labels and checkout notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedRates {
    pub discount: Rate,
    pub tax: Rate,
    pub platform_fee: Rate,
    pub processing: Rate,
    pub processing_fixed: Money,
}

impl AppliedRates {
    fn resolved(fees: &ResolvedFees, discount: Rate) -> Self {
        AppliedRates {
            discount,
            tax: fees.tax,
            platform_fee: fees.platform_fee,
            processing: fees.processing,
            processing_fixed: fees.processing_fixed,
        }
    }
}

/// The rates `cart` is labelled with under `fees`, without computing any amount.
///
/// Used to describe a stored quote whose amounts must not be recomputed.
pub fn applied_rates(cart: &Cart, fees: &FeeSchedule) -> PricingResult<AppliedRates> {
    let fees = resolve_fee_schedule(fees)?;
    let discount = resolve_discount(cart.discount_percent)?;
    Ok(AppliedRates::resolved(&fees, discount))
}

/// Result of [`price`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub breakdown: PriceBreakdown,
    /// Items in cart order, then discount, tax, tip, service fee, processing fee.
    pub receipt_lines: Vec<ReceiptLine>,
    pub rates: AppliedRates,
}

impl PriceQuote {
    /// Σ amount × quantity over every receipt line.
    pub fn receipt_total(&self) -> PricingResult<Money> {
        self.receipt_lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.total()?))
    }

    /// Checks the reconciliation invariants of the breakdown and receipt.
    pub fn reconciles(&self) -> bool {
        let b = &self.breakdown;
        let components =
            b.taxable_cents + b.tax_cents + b.tip_cents + b.platform_fee_cents + b.processing_fee_cents;

        components == b.gross_total_cents
            && b.application_fee_cents == b.platform_fee_cents + b.tip_skim_cents
            && b.gross_total_cents - b.processing_fee_cents - b.application_fee_cents
                == b.seller_net_cents
            && b.seller_net_cents == b.taxable_cents + b.tax_cents + (b.tip_cents - b.tip_skim_cents)
            && self
                .receipt_total()
                .map(|total| total.cents() == b.gross_total_cents)
                .unwrap_or(false)
    }
}

// =============================================================================
// Fee Schedule Resolution
// =============================================================================

/// A fee schedule after validation, in integer form.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedFees {
    pub tax: Rate,
    pub platform_fee: Rate,
    pub platform_fee_cap: Option<Money>,
    pub processing: Rate,
    pub processing_fixed: Money,
    pub tip_skim_threshold: Money,
    pub tip_skim_cap: Money,
}

fn schedule_percent(field: &str, value: f64) -> PricingResult<Rate> {
    if !value.is_finite() {
        return Err(PricingError::invalid_fee_schedule(format!(
            "{} must be a finite number",
            field
        )));
    }
    if value < 0.0 {
        return Err(PricingError::invalid_fee_schedule(format!(
            "{} cannot be negative, got {}",
            field, value
        )));
    }
    Rate::from_percentage(value)
        .map_err(|e| PricingError::invalid_fee_schedule(format!("{}: {}", field, e)))
}

fn schedule_cents(field: &str, cents: i64) -> PricingResult<Money> {
    if cents < 0 {
        return Err(PricingError::invalid_fee_schedule(format!(
            "{} cannot be negative, got {}",
            field, cents
        )));
    }
    Ok(Money::from_cents(cents))
}

/// Validates every schedule field and converts it to integer form.
pub(crate) fn resolve_fee_schedule(fees: &FeeSchedule) -> PricingResult<ResolvedFees> {
    let tax = schedule_percent("tax_percent", fees.tax_percent)?;
    let platform_fee = schedule_percent("platform_fee_percent", fees.platform_fee_percent)?;

    let platform_fee_cap = fees
        .platform_fee_cap_cents
        .map(|cap| schedule_cents("platform_fee_cap_cents", cap))
        .transpose()?;

    if !fees.processing_rate.is_finite() || fees.processing_rate < 0.0 {
        return Err(PricingError::invalid_fee_schedule(format!(
            "processing_rate must be a fraction in [0, 1), got {}",
            fees.processing_rate
        )));
    }
    if fees.processing_rate >= 1.0 {
        return Err(PricingError::invalid_fee_schedule(format!(
            "processing_rate must be below 1, got {}",
            fees.processing_rate
        )));
    }
    let processing = Rate::from_fraction(fees.processing_rate)
        .map_err(|e| PricingError::invalid_fee_schedule(format!("processing_rate: {}", e)))?;

    Ok(ResolvedFees {
        tax,
        platform_fee,
        platform_fee_cap,
        processing,
        processing_fixed: schedule_cents("processing_fixed_cents", fees.processing_fixed_cents)?,
        tip_skim_threshold: schedule_cents(
            "tip_skim_threshold_cents",
            fees.tip_skim_threshold_cents,
        )?,
        tip_skim_cap: schedule_cents("tip_skim_cap_cents", fees.tip_skim_cap_cents)?,
    })
}

// =============================================================================
// Cart Validation
// =============================================================================

fn resolve_discount(percent: f64) -> PricingResult<Rate> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(PricingError::InvalidDiscount { percent });
    }
    Rate::from_percentage(percent).map_err(|_| PricingError::InvalidDiscount { percent })
}

fn resolve_tip(tip_cents: i64) -> PricingResult<Money> {
    if tip_cents < 0 {
        return Err(PricingError::InvalidTip { tip_cents });
    }
    Ok(Money::from_cents(tip_cents))
}

fn validate_line_item(index: usize, item: &CartItem) -> PricingResult<()> {
    if item.unit_price_cents < 0 {
        return Err(PricingError::invalid_line_item(
            index,
            format!("unit price cannot be negative, got {}", item.unit_price_cents),
        ));
    }
    if item.quantity < 0 {
        return Err(PricingError::invalid_line_item(
            index,
            format!("quantity cannot be negative, got {}", item.quantity),
        ));
    }
    if let Some(modifier) = item.modifiers.iter().find(|m| m.unit_price_cents < 0) {
        return Err(PricingError::invalid_line_item(
            index,
            format!(
                "modifier '{}' price cannot be negative, got {}",
                modifier.name, modifier.unit_price_cents
            ),
        ));
    }
    Ok(())
}

// =============================================================================
// Engine
// =============================================================================

/// Portion of the tip the platform keeps.
///
/// Tips at or above `threshold` give up `min(cap, tip)`; smaller tips go
/// entirely to the seller.
///
/// ## Example
/// ```rust
/// use plateful_core::money::Money;
/// use plateful_core::pricing::tip_skim;
///
/// let (threshold, cap) = (Money::from_cents(100), Money::from_cents(100));
/// assert_eq!(tip_skim(Money::from_cents(500), threshold, cap).cents(), 100);
/// assert_eq!(tip_skim(Money::from_cents(99), threshold, cap).cents(), 0);
/// ```
pub fn tip_skim(tip: Money, threshold: Money, cap: Money) -> Money {
    if tip >= threshold {
        cap.min(tip)
    } else {
        Money::zero()
    }
}

/// Solves for the gross charge that leaves exactly `net` after the processor
/// deducts `rate` of the gross plus `fixed`.
///
/// ```text
/// gross = ⌈(net + fixed) / (1 − rate)⌉
/// ```
///
/// With the rate held as `units / 10^scale`, this is computed as
/// `⌈(net + fixed) × 10^scale / (10^scale − units)⌉` in i128, so no float
/// is involved. A zero `net` grosses up to zero: nothing is charged and
/// the processor's fixed fee never applies.
///
/// ## Example
/// ```rust
/// use plateful_core::money::{Money, Rate};
/// use plateful_core::pricing::gross_up;
///
/// let rate = Rate::from_fraction(0.029).unwrap();
/// let gross = gross_up(Money::from_cents(2340), rate, Money::from_cents(30)).unwrap();
/// assert_eq!(gross.cents(), 2441); // ⌈2370 / 0.971⌉
/// ```
pub fn gross_up(net: Money, rate: Rate, fixed: Money) -> PricingResult<Money> {
    if rate.is_whole_or_more() {
        return Err(PricingError::invalid_fee_schedule(format!(
            "processing rate must be below 100%, got {}",
            rate
        )));
    }
    if net.is_negative() {
        return Err(PricingError::invalid_amount("net", "must not be negative"));
    }
    if fixed.is_negative() {
        return Err(PricingError::invalid_amount("fixed fee", "must not be negative"));
    }
    if net.is_zero() {
        return Ok(Money::zero());
    }

    let (units, whole) = rate.ratio();
    let numerator = (net.cents() as i128 + fixed.cents() as i128)
        .checked_mul(whole)
        .ok_or(PricingError::Overflow)?;
    money_from_i128(div_rounded(numerator, whole - units, Rounding::Ceil))
}

/// Prices a cart under a fee schedule.
///
/// Pure and deterministic: identical inputs always give identical output.
/// Every input is validated before any arithmetic; on failure nothing is
/// returned but the error.
///
/// ## Errors
/// - [`PricingError::InvalidFeeSchedule`] - negative or non-finite schedule values, processing rate ≥ 1
/// - [`PricingError::InvalidDiscount`] - discount outside `[0, 100]`
/// - [`PricingError::InvalidTip`] - negative tip
/// - [`PricingError::InvalidLineItem`] - negative price, modifier price, or quantity
/// - [`PricingError::Overflow`] - totals beyond the i64 cent range
pub fn price(cart: &Cart, fees: &FeeSchedule) -> PricingResult<PriceQuote> {
    let fees = resolve_fee_schedule(fees)?;
    let discount_rate = resolve_discount(cart.discount_percent)?;
    let tip = resolve_tip(cart.tip_cents)?;
    for (index, item) in cart.items.iter().enumerate() {
        validate_line_item(index, item)?;
    }

    let items_subtotal = cart
        .items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.line_total()?))?;

    let discount = apply_percent(items_subtotal, discount_rate, Rounding::Round)?;
    let taxable = items_subtotal.checked_sub(discount)?.max(Money::zero());
    let tax = apply_percent(taxable, fees.tax, Rounding::Round)?;
    let platform_fee = cap_at(
        apply_percent(taxable, fees.platform_fee, Rounding::Ceil)?,
        fees.platform_fee_cap,
    );

    let skim = tip_skim(tip, fees.tip_skim_threshold, fees.tip_skim_cap);
    let application_fee = platform_fee.checked_add(skim)?;
    let seller_net = taxable.checked_add(tax)?.checked_add(tip.checked_sub(skim)?)?;

    let gross_total = gross_up(
        seller_net.checked_add(application_fee)?,
        fees.processing,
        fees.processing_fixed,
    )?;
    let processing_fee = gross_total.checked_sub(seller_net)?.checked_sub(application_fee)?;

    let breakdown = PriceBreakdown {
        items_subtotal_cents: items_subtotal.cents(),
        discount_cents: discount.cents(),
        taxable_cents: taxable.cents(),
        tax_cents: tax.cents(),
        tip_cents: tip.cents(),
        tip_skim_cents: skim.cents(),
        platform_fee_cents: platform_fee.cents(),
        processing_fee_cents: processing_fee.cents(),
        application_fee_cents: application_fee.cents(),
        seller_net_cents: seller_net.cents(),
        gross_total_cents: gross_total.cents(),
    };

    let rates = AppliedRates::resolved(&fees, discount_rate);

    let receipt_lines = receipt::build_receipt_lines(cart, &breakdown, &rates)?;

    debug!(
        items = cart.items.len(),
        items_subtotal = breakdown.items_subtotal_cents,
        application_fee = breakdown.application_fee_cents,
        gross_total = breakdown.gross_total_cents,
        "Cart priced"
    );

    Ok(PriceQuote {
        breakdown,
        receipt_lines,
        rates,
    })
}

/// Caller-level check that a quote charges something.
///
/// `price` happily prices an empty cart with no tip (to all zeros). Order
/// submission needs at least one paid line before asking for a checkout link.
pub fn ensure_chargeable(quote: &PriceQuote) -> PricingResult<()> {
    if quote.breakdown.gross_total_cents <= 0 {
        return Err(PricingError::EmptyCartAndNoTip);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReceiptLineKind;

    fn two_tens() -> Cart {
        Cart::new(vec![CartItem::new("Burger", 1000, 2)])
    }

    #[test]
    fn test_single_item_default_schedule() {
        let quote = price(&two_tens(), &FeeSchedule::default()).unwrap();
        let b = &quote.breakdown;

        assert_eq!(b.items_subtotal_cents, 2000);
        assert_eq!(b.discount_cents, 0);
        assert_eq!(b.taxable_cents, 2000);
        assert_eq!(b.tax_cents, 190);
        assert_eq!(b.platform_fee_cents, 150);
        assert_eq!(b.tip_skim_cents, 0);
        assert_eq!(b.seller_net_cents, 2190);
        assert_eq!(b.application_fee_cents, 150);
        // ⌈(2190 + 150 + 30) / 0.971⌉ = ⌈2440.78⌉
        assert_eq!(b.gross_total_cents, 2441);
        assert_eq!(b.processing_fee_cents, 101);
        assert!(quote.reconciles());
    }

    #[test]
    fn test_tip_skim_routes_to_application_fee() {
        let cart = two_tens().with_tip_cents(500);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        let b = &quote.breakdown;

        assert_eq!(b.tip_skim_cents, 100);
        assert_eq!(b.application_fee_cents, 250);
        assert_eq!(b.seller_net_cents, 2590);
        // ⌈(2590 + 250 + 30) / 0.971⌉ = ⌈2955.72⌉
        assert_eq!(b.gross_total_cents, 2956);
        assert_eq!(b.processing_fee_cents, 116);
        assert_eq!(
            b.application_fee_cents + b.seller_net_cents + b.processing_fee_cents,
            b.gross_total_cents
        );
        assert!(quote.reconciles());
    }

    #[test]
    fn test_tip_below_threshold_is_not_skimmed() {
        let cart = two_tens().with_tip_cents(99);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        assert_eq!(quote.breakdown.tip_skim_cents, 0);
        assert_eq!(quote.breakdown.seller_net_cents, 2190 + 99);
    }

    #[test]
    fn test_small_tip_at_threshold_is_fully_skimmed() {
        let cart = two_tens().with_tip_cents(100);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        assert_eq!(quote.breakdown.tip_skim_cents, 100);
        assert_eq!(quote.breakdown.seller_net_cents, 2190);
    }

    #[test]
    fn test_platform_fee_cap() {
        let cart = Cart::new(vec![CartItem::new("Catering tray", 200_000, 1)]);
        let fees = FeeSchedule::default();
        let quote = price(&cart, &fees).unwrap();
        assert_eq!(quote.breakdown.platform_fee_cents, 995);

        let uncapped = FeeSchedule {
            platform_fee_cap_cents: None,
            ..fees
        };
        let quote = price(&cart, &uncapped).unwrap();
        assert_eq!(quote.breakdown.platform_fee_cents, 15_000);
        assert!(quote.reconciles());
    }

    #[test]
    fn test_platform_fee_rounds_up() {
        // 1001 × 7.5% = 75.075 → 76
        let cart = Cart::new(vec![CartItem::new("Salad", 1001, 1)]);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        assert_eq!(quote.breakdown.platform_fee_cents, 76);
        // 1001 × 9.5% = 95.095 → 95
        assert_eq!(quote.breakdown.tax_cents, 95);
    }

    #[test]
    fn test_discount_applied_before_tax_and_fee() {
        let cart = two_tens().with_discount_percent(10.0);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        let b = &quote.breakdown;

        assert_eq!(b.discount_cents, 200);
        assert_eq!(b.taxable_cents, 1800);
        assert_eq!(b.tax_cents, 171);
        assert_eq!(b.platform_fee_cents, 135);
        assert!(quote.reconciles());
        assert!(quote
            .receipt_lines
            .iter()
            .any(|l| l.kind == ReceiptLineKind::Discount && l.amount_cents == -200));
    }

    #[test]
    fn test_discount_boundaries() {
        let zero = price(&two_tens(), &FeeSchedule::default()).unwrap();
        assert_eq!(zero.breakdown.discount_cents, 0);

        let full = price(&two_tens().with_discount_percent(100.0), &FeeSchedule::default()).unwrap();
        assert_eq!(full.breakdown.taxable_cents, 0);
        assert_eq!(full.breakdown.tax_cents, 0);
        assert_eq!(full.breakdown.platform_fee_cents, 0);
        assert_eq!(full.breakdown.gross_total_cents, 0);
        assert!(full.reconciles());
    }

    #[test]
    fn test_invalid_discount_rejected() {
        for bad in [150.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = price(&two_tens().with_discount_percent(bad), &FeeSchedule::default())
                .unwrap_err();
            assert!(matches!(err, PricingError::InvalidDiscount { .. }));
        }
    }

    #[test]
    fn test_rates_are_applied_without_prior_rounding() {
        let cart = Cart::new(vec![CartItem::new("Banquet", 10_000_000, 1)])
            .with_discount_percent(99.99996);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        assert_eq!(quote.breakdown.discount_cents, 9_999_996);
        assert_eq!(quote.breakdown.taxable_cents, 4);
        assert!(quote.reconciles());

        let fees = FeeSchedule {
            tax_percent: 33.333333,
            ..FeeSchedule::default()
        };
        let cart = Cart::new(vec![CartItem::new("Banquet", 3_000_000, 1)]);
        let quote = price(&cart, &fees).unwrap();
        // 3_000_000 × 33.333333% = 999_999.99
        assert_eq!(quote.breakdown.tax_cents, 1_000_000);
        assert!(quote.reconciles());
    }

    #[test]
    fn test_too_precise_rates_are_rejected() {
        let err = price(&two_tens().with_discount_percent(1e-17), &FeeSchedule::default())
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidDiscount { .. }));

        let fees = FeeSchedule {
            platform_fee_percent: 1e-17,
            ..FeeSchedule::default()
        };
        assert!(matches!(
            price(&two_tens(), &fees),
            Err(PricingError::InvalidFeeSchedule { .. })
        ));
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let fees = FeeSchedule::default();

        let cart = Cart::new(vec![CartItem::new("Refund?", -100, 1)]);
        assert!(matches!(
            price(&cart, &fees),
            Err(PricingError::InvalidLineItem { index: 0, .. })
        ));

        let cart = Cart::new(vec![
            CartItem::new("Fries", 300, 1),
            CartItem::new("Shake", 500, -2),
        ]);
        assert!(matches!(
            price(&cart, &fees),
            Err(PricingError::InvalidLineItem { index: 1, .. })
        ));

        let cart = Cart::new(vec![CartItem::new("Bowl", 900, 1).with_modifier("Coupon", -50)]);
        assert!(matches!(
            price(&cart, &fees),
            Err(PricingError::InvalidLineItem { index: 0, .. })
        ));

        let cart = two_tens().with_tip_cents(-1);
        assert_eq!(
            price(&cart, &fees).unwrap_err(),
            PricingError::InvalidTip { tip_cents: -1 }
        );
    }

    #[test]
    fn test_invalid_fee_schedule_rejected() {
        let cart = two_tens();
        let base = FeeSchedule::default();

        let cases = [
            FeeSchedule { processing_rate: 1.0, ..base.clone() },
            FeeSchedule { processing_rate: 1.5, ..base.clone() },
            FeeSchedule { processing_rate: 1e-19, ..base.clone() },
            FeeSchedule { tax_percent: 1e-17, ..base.clone() },
            FeeSchedule { processing_rate: -0.01, ..base.clone() },
            FeeSchedule { tax_percent: -1.0, ..base.clone() },
            FeeSchedule { platform_fee_percent: f64::NAN, ..base.clone() },
            FeeSchedule { platform_fee_cap_cents: Some(-1), ..base.clone() },
            FeeSchedule { processing_fixed_cents: -30, ..base.clone() },
            FeeSchedule { tip_skim_cap_cents: -100, ..base.clone() },
        ];

        for fees in cases {
            assert!(
                matches!(price(&cart, &fees), Err(PricingError::InvalidFeeSchedule { .. })),
                "expected InvalidFeeSchedule for {:?}",
                fees
            );
        }
    }

    #[test]
    fn test_schedule_checked_before_cart() {
        // Both inputs are bad; the schedule is reported, nothing is computed.
        let cart = two_tens().with_discount_percent(150.0);
        let fees = FeeSchedule {
            processing_rate: 1.0,
            ..FeeSchedule::default()
        };
        assert!(matches!(
            price(&cart, &fees),
            Err(PricingError::InvalidFeeSchedule { .. })
        ));
    }

    #[test]
    fn test_empty_cart_without_tip_is_all_zero() {
        let quote = price(&Cart::default(), &FeeSchedule::default()).unwrap();
        assert_eq!(quote.breakdown, PriceBreakdown::default());
        assert!(quote.receipt_lines.is_empty());
        assert!(quote.reconciles());
        assert_eq!(ensure_chargeable(&quote), Err(PricingError::EmptyCartAndNoTip));
    }

    #[test]
    fn test_empty_cart_with_tip_grosses_up_tip() {
        let cart = Cart::default().with_tip_cents(500);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        let b = &quote.breakdown;

        assert_eq!(b.items_subtotal_cents, 0);
        assert_eq!(b.tip_skim_cents, 100);
        assert_eq!(b.seller_net_cents, 400);
        // ⌈(400 + 100 + 30) / 0.971⌉ = ⌈545.83⌉
        assert_eq!(b.gross_total_cents, 546);
        assert!(quote.reconciles());
        assert!(ensure_chargeable(&quote).is_ok());
    }

    #[test]
    fn test_zero_quantity_lines_are_kept() {
        let cart = Cart::new(vec![
            CartItem::new("Burger", 1000, 1),
            CartItem::new("Fries", 300, 0),
        ]);
        let quote = price(&cart, &FeeSchedule::default()).unwrap();
        assert_eq!(quote.breakdown.items_subtotal_cents, 1000);
        let items: Vec<_> = quote
            .receipt_lines
            .iter()
            .filter(|l| l.kind == ReceiptLineKind::Item)
            .collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].quantity, 0);
    }

    #[test]
    fn test_zero_schedule_charges_goods_only() {
        let cart = two_tens().with_tip_cents(300);
        let quote = price(&cart, &FeeSchedule::zero()).unwrap();
        let b = &quote.breakdown;
        assert_eq!(b.gross_total_cents, 2300);
        assert_eq!(b.processing_fee_cents, 0);
        // threshold 0, cap 0 → skim is min(0, tip)
        assert_eq!(b.tip_skim_cents, 0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let cart = Cart::new(vec![CartItem::new("Gold plate", i64::MAX / 2, 3)]);
        assert_eq!(
            price(&cart, &FeeSchedule::default()).unwrap_err(),
            PricingError::Overflow
        );
    }

    #[test]
    fn test_receipt_total_overflow_does_not_reconcile() {
        let mut quote = price(&two_tens(), &FeeSchedule::default()).unwrap();
        quote.receipt_lines[0].amount_cents = i64::MAX;
        assert_eq!(quote.receipt_total().unwrap_err(), PricingError::Overflow);
        assert!(!quote.reconciles());
    }

    #[test]
    fn test_applied_rates_match_price() {
        let cart = two_tens().with_discount_percent(12.5);
        let fees = FeeSchedule::default();
        let rates = applied_rates(&cart, &fees).unwrap();
        assert_eq!(rates, price(&cart, &fees).unwrap().rates);
        assert_eq!(rates.discount.to_string(), "12.5%");

        assert!(matches!(
            applied_rates(&cart.with_discount_percent(101.0), &fees),
            Err(PricingError::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn test_gross_up_covers_nominal_fee() {
        let rate = Rate::from_fraction(0.029).unwrap();
        let fixed = Money::from_cents(30);
        for net in [1i64, 7, 99, 100, 1234, 2340, 99_999, 1_000_000] {
            let gross = gross_up(Money::from_cents(net), rate, fixed).unwrap().cents() as i128;
            let needed = (net as i128 + 30) * 1_000_000;
            // gross × 0.971 covers net + fixed
            assert!(gross * 971_000 >= needed, "net {} gross {}", net, gross);
            // one cent less would not
            assert!((gross - 1) * 971_000 < needed, "net {} gross {}", net, gross);
        }
    }

    #[test]
    fn test_gross_up_edge_cases() {
        let rate = Rate::from_fraction(0.029).unwrap();
        assert!(gross_up(Money::zero(), rate, Money::from_cents(30)).unwrap().is_zero());
        assert!(gross_up(Money::from_cents(-1), rate, Money::zero()).is_err());
        assert!(matches!(
            gross_up(Money::from_cents(100), Rate::from_fraction(1.0).unwrap(), Money::zero()),
            Err(PricingError::InvalidFeeSchedule { .. })
        ));
        assert_eq!(
            gross_up(Money::from_cents(100), Rate::zero(), Money::zero()).unwrap().cents(),
            100
        );
    }

    #[test]
    fn test_tip_skim_rule() {
        let t = Money::from_cents(100);
        let c = Money::from_cents(100);
        assert_eq!(tip_skim(Money::from_cents(0), t, c).cents(), 0);
        assert_eq!(tip_skim(Money::from_cents(100), t, c).cents(), 100);
        assert_eq!(tip_skim(Money::from_cents(2500), t, c).cents(), 100);
        assert_eq!(
            tip_skim(Money::from_cents(150), Money::from_cents(100), Money::from_cents(500)).cents(),
            150
        );
    }

    #[test]
    fn test_price_is_idempotent() {
        let cart = Cart::new(vec![
            CartItem::new("Ramen", 1450, 2).with_modifier("Egg", 200),
            CartItem::new("Gyoza", 800, 1).with_notes("extra crispy"),
        ])
        .with_discount_percent(15.0)
        .with_tip_cents(375);
        let fees = FeeSchedule::default();

        let first = price(&cart, &fees).unwrap();
        let second = price(&cart, &fees).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_reconciliation_over_input_grid() {
        let fees = FeeSchedule::default();
        for unit in [0i64, 1, 99, 333, 1000, 1999, 25_000] {
            for qty in [0i64, 1, 3, 7] {
                for discount in [0.0, 5.0, 12.5, 33.0, 100.0] {
                    for tip in [0i64, 50, 100, 101, 1000] {
                        let cart = Cart::new(vec![
                            CartItem::new("A", unit, qty).with_modifier("m", 75),
                            CartItem::new("B", 450, 1),
                        ])
                        .with_discount_percent(discount)
                        .with_tip_cents(tip);
                        let quote = price(&cart, &fees).unwrap();
                        assert!(quote.reconciles(), "{:?}", quote.breakdown);
                        assert!(quote.breakdown.processing_fee_cents >= 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let fees = FeeSchedule::default();
        let gross = |unit: i64, qty: i64, tip: i64, tax: f64| {
            let cart = Cart::new(vec![CartItem::new("X", unit, qty)])
                .with_discount_percent(10.0)
                .with_tip_cents(tip);
            let fees = FeeSchedule {
                tax_percent: tax,
                ..fees.clone()
            };
            price(&cart, &fees).unwrap().breakdown.gross_total_cents
        };

        let mut prev = 0;
        for unit in 0..400 {
            let g = gross(unit, 2, 0, 9.5);
            assert!(g >= prev, "unit price {}", unit);
            prev = g;
        }

        let mut prev = 0;
        for qty in 0..50 {
            let g = gross(777, qty, 0, 9.5);
            assert!(g >= prev, "quantity {}", qty);
            prev = g;
        }

        let mut prev = 0;
        for tip in 0..400 {
            let g = gross(777, 1, tip, 9.5);
            assert!(g >= prev, "tip {}", tip);
            prev = g;
        }

        let mut prev = 0;
        for tenths in 0..200 {
            let g = gross(777, 1, 0, tenths as f64 / 10.0);
            assert!(g >= prev, "tax {}", tenths);
            prev = g;
        }
    }
}
