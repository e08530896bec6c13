//! # plateful-core: Order Pricing & Fee Allocation for Plateful
//!
//! This crate is the **heart** of Plateful. It turns a restaurant cart into
//! an itemized charge that reconciles to the cent with what the card
//! processor settles. Everything here is a pure function with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Plateful Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Order form (TypeScript)                      │   │
//! │  │    Menu ──► Cart ──► Customer ──► "Send payment link"           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    plateful-orders                              │   │
//! │  │    OrderService: quote, submit_with_checkout, dashboard        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼────────────────────┐  │
//! │  │  ★ plateful-core (THIS CRATE) ★ │  │  plateful-db                │  │
//! │  │                                 │  │  SQLite order records       │  │
//! │  │  money  pricing  receipt        │  └─────────────────────────────┘  │
//! │  │  types  validation  error       │                                   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO DATABASE • PURE    │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money and Rate types, explicit rounding
//! - [`pricing`] - The pricing engine and processing-fee gross-up
//! - [`receipt`] - Receipt line labels and assembly
//! - [`types`] - Cart, FeeSchedule, PriceBreakdown, Order
//! - [`validation`] - Order form rules the engine does not cover
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same cart + same schedule = byte-identical quote
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: cents in i64, rates as exact decimal fractions, i128 intermediates
//! 4. **Validate First**: every input is checked before any arithmetic runs
//!
//! ## Example Usage
//!
//! ```rust
//! use plateful_core::{price, Cart, CartItem, FeeSchedule};
//!
//! let cart = Cart::new(vec![CartItem::new("Burger", 1000, 2)]).with_tip_cents(500);
//! let quote = price(&cart, &FeeSchedule::default()).unwrap();
//!
//! let b = &quote.breakdown;
//! assert_eq!(b.application_fee_cents, 250); // $1.50 service fee + $1.00 of tip
//! assert_eq!(b.seller_net_cents, 2590);
//! assert_eq!(b.application_fee_cents + b.seller_net_cents + b.processing_fee_cents, b.gross_total_cents);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, PricingError, PricingResult, ValidationError};
pub use money::{Money, Rate, Rounding};
pub use pricing::{
    applied_rates, ensure_chargeable, gross_up, price, tip_skim, AppliedRates, PriceQuote,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single order.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos on the order form (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum modifiers on one line.
pub const MAX_MODIFIERS_PER_ITEM: usize = 20;

/// Maximum length of order or item notes, in characters.
pub const MAX_NOTES_LEN: usize = 500;

/// The only settlement currency.
pub const CURRENCY: &str = "usd";
