//! # Error Types
//!
//! Domain-specific error types for plateful-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  plateful-core errors (this file)                                      │
//! │  ├── PricingError     - Cart/fee inputs the engine cannot price        │
//! │  ├── ValidationError  - Order form field failures                      │
//! │  └── CoreError        - Wraps both + order lifecycle violations        │
//! │                                                                         │
//! │  plateful-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  plateful-orders errors                                                │
//! │  └── OrderError       - What the submission caller sees                │
//! │                                                                         │
//! │  Flow: PricingError → CoreError → OrderError → caller message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, line index, value)
//! 3. Every pricing failure is raised before any arithmetic runs

use thiserror::Error;

use crate::types::PaymentStatus;

// =============================================================================
// Pricing Error
// =============================================================================

/// Inputs the pricing engine refuses to price.
///
/// The engine validates the whole cart and fee schedule up front, so a
/// `PricingError` always means no breakdown was produced at all. Pricing is
/// deterministic; resubmitting the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// A monetary input is non-finite, out of range, or negative where disallowed.
    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    /// Discount percent outside `[0, 100]`.
    ///
    /// ## User Workflow
    /// ```text
    /// Staff types discount: 150
    ///      │
    ///      ▼
    /// price() ← rejects before computing anything
    ///      │
    ///      ▼
    /// InvalidDiscount { percent: 150.0 }
    ///      │
    ///      ▼
    /// Form shows: "Discount must be between 0 and 100 percent, got 150"
    /// ```
    #[error("Discount must be between 0 and 100 percent, got {percent}")]
    InvalidDiscount { percent: f64 },

    /// Negative quantity or negative item/modifier price.
    #[error("Invalid line item #{index}: {reason}")]
    InvalidLineItem { index: usize, reason: String },

    /// Negative tip.
    #[error("Tip cannot be negative, got {tip_cents} cents")]
    InvalidTip { tip_cents: i64 },

    /// Processing rate at or above 1, or any schedule value negative or non-finite.
    #[error("Invalid fee schedule: {reason}")]
    InvalidFeeSchedule { reason: String },

    /// Nothing to charge: no paid items and no tip.
    ///
    /// Never returned by `price` itself; raised by [`crate::pricing::ensure_chargeable`]
    /// for callers that need at least one paid line.
    #[error("Order has no paid items and no tip")]
    EmptyCartAndNoTip,

    /// Intermediate arithmetic exceeded the i64 cent range.
    #[error("Amount too large to price")]
    Overflow,
}

impl PricingError {
    /// Creates an InvalidAmount error.
    pub fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidFeeSchedule error.
    pub fn invalid_fee_schedule(reason: impl Into<String>) -> Self {
        PricingError::InvalidFeeSchedule {
            reason: reason.into(),
        }
    }

    /// Creates an InvalidLineItem error.
    pub fn invalid_line_item(index: usize, reason: impl Into<String>) -> Self {
        PricingError::InvalidLineItem {
            index,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Order form validation errors.
///
/// These cover fields the pricing engine does not care about (customer
/// name, phone, delivery address) plus submission limits on the cart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, malformed phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The cart or fee schedule could not be priced.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// An order form field failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Payment status change not allowed by the order lifecycle.
    ///
    /// ## When This Occurs
    /// - Marking a refunded order as paid
    /// - Refunding an order that was never paid
    #[error("Cannot move order {order_id} from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with PricingError.
pub type PricingResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
