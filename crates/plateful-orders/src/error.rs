//! # Order Error Type
//!
//! Unified error type for the order submission flow.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ─┐                                                     │
//! │  PricingError    ─┤                                                     │
//! │  CoreError       ─┤                                                     │
//! │  CheckoutError   ─┼──► OrderError ──► ErrorBody { code, message }       │
//! │  DbError         ─┤                   (what the order form shows)       │
//! │  ConfigError     ─┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures are logged in full and reported with a generic message.

use plateful_core::{CoreError, PricingError, ValidationError};
use plateful_db::DbError;
use serde::Serialize;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Errors returned by [`crate::service::OrderService`].
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Storage(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Order not found: {0}")]
    NotFound(String),

    /// Input that could not be read or parsed (cart files, JSON bodies).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the order flow.
pub type OrderResult<T> = Result<T, OrderError>;

/// Error codes for callers.
///
/// ## Usage in the Order Form
/// ```typescript
/// switch (e.code) {
///   case 'VALIDATION_ERROR': showFieldError(e.message); break;
///   case 'PRICING_ERROR':    showCartError(e.message);  break;
///   case 'CHECKOUT_ERROR':   offerRetry();              break;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    PricingError,
    CheckoutError,
    NotFound,
    Conflict,
    DatabaseError,
    ConfigError,
}

/// Serializable error shown to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl OrderError {
    /// Machine-readable category.
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::Validation(_) | OrderError::InvalidInput(_) => ErrorCode::ValidationError,
            OrderError::Pricing(_) => ErrorCode::PricingError,
            OrderError::Core(CoreError::Pricing(_)) => ErrorCode::PricingError,
            OrderError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            OrderError::Core(CoreError::InvalidStatusTransition { .. }) => ErrorCode::Conflict,
            OrderError::Checkout(_) => ErrorCode::CheckoutError,
            OrderError::NotFound(_) => ErrorCode::NotFound,
            OrderError::Storage(DbError::NotFound { .. }) => ErrorCode::NotFound,
            OrderError::Storage(DbError::InvalidTransition(_) | DbError::Conflict { .. }) => {
                ErrorCode::Conflict
            }
            OrderError::Storage(_) => ErrorCode::DatabaseError,
            OrderError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// The body returned to the order form.
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            OrderError::Storage(
                DbError::QueryFailed(_)
                | DbError::Internal(_)
                | DbError::Serialization(_)
                | DbError::MigrationFailed(_),
            ) => {
                tracing::error!(error = %self, "Order storage failed");
                "Database operation failed".to_string()
            }
            OrderError::Storage(DbError::ConnectionFailed(_) | DbError::PoolExhausted) => {
                "Database unavailable".to_string()
            }
            other => other.to_string(),
        };

        ErrorBody {
            code: self.code(),
            message,
        }
    }
}
