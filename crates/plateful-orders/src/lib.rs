//! # plateful-orders: Order Submission for Plateful
//!
//! Turns an order form submission into a stored, priced order with a
//! hosted checkout link.
//!
//! ## Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order form ──► OrderService ──┬──► plateful-core  (price, validate)    │
//! │                                ├──► CheckoutLinkProvider (payments)     │
//! │                                └──► plateful-db    (orders table)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`service`] - The submission flow
//! - [`checkout`] - Checkout request building and the provider trait
//! - [`config`] - Environment configuration and fee schedule loading
//! - [`error`] - Unified error type and caller-facing codes
//! - [`telemetry`] - Tracing setup

pub mod checkout;
pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

pub use checkout::{CheckoutError, CheckoutLink, CheckoutLineItem, CheckoutLinkProvider, CheckoutRequest};
pub use config::{ConfigError, OrderingConfig};
pub use error::{ErrorBody, ErrorCode, OrderError, OrderResult};
pub use service::{OrderService, OrderSubmission, SubmittedOrder};
