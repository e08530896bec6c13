//! # Receipt Lines
//!
//! Builds the itemized lines a payer sees from a priced breakdown.
//!
//! ## Line Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Burger (Cheese, Bacon)               $13.50  × 2           │  ← items, cart order
//! │  Fries                                 $3.00  × 1           │
//! │  Discount (10%)                       -$3.00                │  ← only if non-zero
//! │  Tax (9.5%)                            $2.57                │
//! │  Tip                                   $5.00                │
//! │  Service fee (7.5%) incl. $1.00 tip    $2.03                │
//! │  Processing fee (2.9% + $0.30)         $1.25                │
//! │  ──────────────────────────────────────────────             │
//! │  Σ amount × quantity                = gross total           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Item lines are always emitted (even at quantity zero). Every other line is
//! emitted only when its amount is non-zero.

use crate::error::PricingResult;
use crate::money::Money;
use crate::pricing::AppliedRates;
use crate::types::{Cart, CartItem, PriceBreakdown, ReceiptLine, ReceiptLineKind};

const FALLBACK_ITEM_LABEL: &str = "Item";
const FALLBACK_MODIFIER_LABEL: &str = "Option";

/// Display label for an item line: `"Name (Mod1, Mod2)"`.
///
/// Blank names fall back to `"Item"`; blank modifier names to `"Option"`.
///
/// ## Example
/// ```rust
/// use plateful_core::receipt::item_label;
/// use plateful_core::CartItem;
///
/// let item = CartItem::new("Burger", 1000, 1)
///     .with_modifier("Cheese", 150)
///     .with_modifier("", 0);
/// assert_eq!(item_label(&item), "Burger (Cheese, Option)");
/// ```
pub fn item_label(item: &CartItem) -> String {
    let name = match item.name.trim() {
        "" => FALLBACK_ITEM_LABEL,
        trimmed => trimmed,
    };

    if item.modifiers.is_empty() {
        return name.to_string();
    }

    let modifiers: Vec<&str> = item
        .modifiers
        .iter()
        .map(|m| match m.name.trim() {
            "" => FALLBACK_MODIFIER_LABEL,
            trimmed => trimmed,
        })
        .collect();

    format!("{} ({})", name, modifiers.join(", "))
}

fn processing_label(rates: &AppliedRates) -> String {
    match (rates.processing.is_zero(), rates.processing_fixed.is_zero()) {
        (false, false) => format!("Processing fee ({} + {})", rates.processing, rates.processing_fixed),
        (false, true) => format!("Processing fee ({})", rates.processing),
        (true, false) => format!("Processing fee ({})", rates.processing_fixed),
        (true, true) => "Processing fee".to_string(),
    }
}

fn single(kind: ReceiptLineKind, label: String, amount: Money) -> ReceiptLine {
    ReceiptLine {
        kind,
        label,
        amount_cents: amount.cents(),
        quantity: 1,
    }
}

/// Assembles the receipt for a cart and its breakdown.
pub(crate) fn build_receipt_lines(
    cart: &Cart,
    breakdown: &PriceBreakdown,
    rates: &AppliedRates,
) -> PricingResult<Vec<ReceiptLine>> {
    let mut lines = Vec::with_capacity(cart.items.len() + 5);

    for item in &cart.items {
        lines.push(ReceiptLine {
            kind: ReceiptLineKind::Item,
            label: item_label(item),
            amount_cents: item.effective_unit_price()?.cents(),
            quantity: item.quantity,
        });
    }

    let discount = Money::from_cents(breakdown.discount_cents);
    if !discount.is_zero() {
        lines.push(single(
            ReceiptLineKind::Discount,
            format!("Discount ({})", rates.discount),
            -discount,
        ));
    }

    let tax = Money::from_cents(breakdown.tax_cents);
    if !tax.is_zero() {
        lines.push(single(ReceiptLineKind::Tax, format!("Tax ({})", rates.tax), tax));
    }

    let skim = Money::from_cents(breakdown.tip_skim_cents);
    let platform_fee = Money::from_cents(breakdown.platform_fee_cents);

    let tip = Money::from_cents(breakdown.tip_cents);
    if !tip.is_zero() {
        // With no service fee line to carry it, the tip line discloses the skim.
        let label = if !skim.is_zero() && platform_fee.is_zero() {
            format!("Tip ({} to platform)", skim)
        } else {
            "Tip".to_string()
        };
        lines.push(single(ReceiptLineKind::Tip, label, tip));
    }

    if !platform_fee.is_zero() {
        let mut label = format!("Service fee ({})", rates.platform_fee);
        if !skim.is_zero() {
            label.push_str(&format!(" incl. {} from tip", skim));
        }
        lines.push(single(ReceiptLineKind::PlatformFee, label, platform_fee));
    }

    let processing_fee = Money::from_cents(breakdown.processing_fee_cents);
    if !processing_fee.is_zero() {
        lines.push(single(
            ReceiptLineKind::ProcessingFee,
            processing_label(rates),
            processing_fee,
        ));
    }

    Ok(lines)
}

/// Short note describing the service fee, for the checkout page.
///
/// ## Example
/// ```rust
/// use plateful_core::{price, receipt, Cart, CartItem, FeeSchedule};
///
/// let quote = price(&Cart::new(vec![CartItem::new("Burger", 1000, 2)]), &FeeSchedule::default()).unwrap();
/// assert_eq!(receipt::service_fee_note(&quote), "Includes service fee $1.50 (7.5%).");
/// ```
pub fn service_fee_note(quote: &crate::pricing::PriceQuote) -> String {
    let fee = Money::from_cents(quote.breakdown.platform_fee_cents);
    let skim = Money::from_cents(quote.breakdown.tip_skim_cents);

    if skim.is_zero() {
        format!("Includes service fee {} ({}).", fee, quote.rates.platform_fee)
    } else {
        format!(
            "Includes service fee {} ({}) and {} of the tip.",
            fee, quote.rates.platform_fee, skim
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
